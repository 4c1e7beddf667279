//! r_counter tool - counts the letter `r` in the query

use async_trait::async_trait;

use super::Tool;
use crate::error::Result;

/// Case-sensitive count of `letter` in `text`
pub fn count_letter(text: &str, letter: char) -> usize {
    text.chars().filter(|c| *c == letter).count()
}

pub struct RCounterTool;

#[async_trait]
impl Tool for RCounterTool {
    fn name(&self) -> &'static str {
        "r_counter"
    }

    fn description(&self) -> &'static str {
        "Count how many times the lowercase letter 'r' appears in the query"
    }

    async fn invoke(&self, query: &str) -> Result<String> {
        Ok(count_letter(query, 'r').to_string())
    }
}
