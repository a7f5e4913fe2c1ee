use crate::types::Sample;
use thiserror::Error;

/// Integers per sample (x, y, z).
const AXES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedSampleError {
    #[error("Expected exactly 3 integers per sample, found {found}")]
    TokenCount { found: usize },
    #[error("Token count {found} is not a positive multiple of 3")]
    NotAMultipleOfThree { found: usize },
    #[error("Token {index} ({token:?}) is not a signed integer")]
    InvalidToken { index: usize, token: String },
    #[error("Expected {expected} samples, found {found}")]
    SampleCount { expected: usize, found: usize },
}

/// Parse a single `"x y z"` record.
pub fn parse_sample(record: &str) -> Result<Sample, MalformedSampleError> {
    let values = parse_tokens(record)?;
    match values[..] {
        [x, y, z] => Ok(Sample::new(x, y, z)),
        _ => Err(MalformedSampleError::TokenCount {
            found: values.len(),
        }),
    }
}

/// Parse `"x1 y1 z1 x2 y2 z2 ..."` into samples.
pub fn parse_samples(payload: &str) -> Result<Vec<Sample>, MalformedSampleError> {
    let values = parse_tokens(payload)?;
    if values.is_empty() || values.len() % AXES != 0 {
        return Err(MalformedSampleError::NotAMultipleOfThree {
            found: values.len(),
        });
    }

    Ok(values
        .chunks_exact(AXES)
        .map(|c| Sample::new(c[0], c[1], c[2]))
        .collect())
}

/// Parse a payload that must hold exactly `expected` samples.
pub fn parse_window(payload: &str, expected: usize) -> Result<Vec<Sample>, MalformedSampleError> {
    let samples = parse_samples(payload)?;
    if samples.len() != expected {
        return Err(MalformedSampleError::SampleCount {
            expected,
            found: samples.len(),
        });
    }
    Ok(samples)
}

fn parse_tokens(text: &str) -> Result<Vec<i32>, MalformedSampleError> {
    text.split_whitespace()
        .enumerate()
        .map(|(index, token)| {
            token
                .parse::<i32>()
                .map_err(|_| MalformedSampleError::InvalidToken {
                    index,
                    token: token.to_owned(),
                })
        })
        .collect()
}
