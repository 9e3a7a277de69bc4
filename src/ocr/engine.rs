use anyhow::{anyhow, Context, Result};
use image::{ImageBuffer, Luma};
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

use super::setup::{find_tesseract, TesseractPaths};
use crate::solver::RecognizedToken;

/// Characters Tesseract is allowed to report.
const CHAR_WHITELIST: &str = "0123456789+-*/÷";

/// Tesseract TSV level for a single word.
const WORD_LEVEL: i32 = 5;

/// Anything that turns a preprocessed frame into positioned text tokens.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, img: &ImageBuffer<Luma<u8>, Vec<u8>>) -> Result<Vec<RecognizedToken>>;
}

/// Runs the Tesseract executable once per frame.
pub struct TesseractRecognizer {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
}

impl TesseractRecognizer {
    pub fn new() -> Result<Self> {
        let TesseractPaths {
            executable,
            tessdata,
        } = find_tesseract()?;
        Ok(Self {
            executable,
            tessdata,
        })
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, img: &ImageBuffer<Luma<u8>, Vec<u8>>) -> Result<Vec<RecognizedToken>> {
        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())
            .context("Failed to write OCR input image")?;

        // Tesseract appends .tsv to the output base
        let temp_output = NamedTempFile::new()?;
        let output_base = temp_output.path().to_string_lossy().to_string();

        let mut command = Command::new(&self.executable);
        command.arg(temp_input.path()).arg(&output_base);
        if let Some(tessdata) = &self.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }
        let output = command
            .arg("-l")
            .arg("eng")
            .arg("--oem")
            .arg("3")
            .arg("--psm")
            .arg("6") // Assume single uniform block of text
            .arg("-c")
            .arg(format!("tessedit_char_whitelist={}", CHAR_WHITELIST))
            .arg("tsv")
            .output()
            .context("Failed to run Tesseract")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        let tsv_path = format!("{}.tsv", output_base);
        let tsv_content = std::fs::read_to_string(&tsv_path)
            .map_err(|e| anyhow!("Failed to read Tesseract output: {}", e))?;
        let _ = std::fs::remove_file(&tsv_path);

        Ok(parse_tsv_output(&tsv_content))
    }
}

/// Parses Tesseract TSV output into word tokens.
///
/// Word rows with empty text are kept (the normalizer drops them) so that
/// token neighbors match what Tesseract reported.
pub fn parse_tsv_output(tsv: &str) -> Vec<RecognizedToken> {
    let mut tokens = Vec::new();

    // Skip header
    for line in tsv.lines().skip(1) {
        // TSV fields: level, page_num, block_num, par_num, line_num, word_num,
        //             left, top, width, height, conf, text
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 11 {
            continue;
        }

        let level: i32 = fields[0].trim().parse().unwrap_or(-1);
        if level != WORD_LEVEL {
            continue;
        }

        let parse_int = |s: &str| s.trim().parse::<i32>().unwrap_or(0);
        let conf: f32 = fields[10].trim().parse().unwrap_or(-1.0);

        tokens.push(RecognizedToken {
            text: fields.get(11).copied().unwrap_or("").to_string(),
            x: parse_int(fields[6]),
            y: parse_int(fields[7]),
            width: parse_int(fields[8]),
            height: parse_int(fields[9]),
            confidence: conf.round().clamp(0.0, 100.0) as i32,
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    #[test]
    fn test_parse_tsv_words() {
        let tsv = format!(
            "{}\n\
             1\t1\t0\t0\t0\t0\t0\t0\t720\t400\t-1\t\n\
             4\t1\t1\t1\t1\t0\t10\t200\t80\t30\t-1\t\n\
             5\t1\t1\t1\t1\t1\t10\t200\t25\t30\t91.52\t12\n\
             5\t1\t1\t1\t1\t2\t40\t200\t15\t30\t85.1\t÷\n\
             5\t1\t1\t1\t1\t3\t60\t200\t15\t30\t88\t4\n",
            HEADER
        );

        let tokens = parse_tsv_output(&tsv);

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], RecognizedToken::new("12", 10, 200, 25, 30, 92));
        assert_eq!(tokens[1].text, "÷");
        assert_eq!(tokens[1].confidence, 85);
        assert_eq!(tokens[2].x, 60);
    }

    #[test]
    fn test_parse_tsv_keeps_empty_words() {
        let tsv = format!(
            "{}\n5\t1\t1\t1\t1\t1\t10\t200\t25\t30\t-1\n5\t1\t1\t1\t1\t2\t40\t200\t15\t30\t95\t \n",
            HEADER
        );

        let tokens = parse_tsv_output(&tsv);

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "");
        assert_eq!(tokens[0].confidence, 0);
        assert_eq!(tokens[1].text, " ");
    }

    #[test]
    fn test_parse_tsv_skips_malformed_rows() {
        let tsv = format!("{}\nnot a row\n5\t1\t1\n", HEADER);
        assert!(parse_tsv_output(&tsv).is_empty());
    }

    #[test]
    fn test_parse_tsv_empty() {
        assert!(parse_tsv_output("").is_empty());
    }
}
