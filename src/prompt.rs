// Interactive questions on the terminal.

use std::io::{BufRead, Write};

use crate::errors::TrackerError;

/// Ask `question` until a non-empty answer arrives.
///
/// End of input before any answer is an `EmptyInput` error for `field`.
pub fn ask_nonempty<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    field: &'static str,
) -> Result<String, TrackerError> {
    loop {
        write!(output, "{}", question)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Err(TrackerError::EmptyInput { field });
        }

        let answer = line.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
        writeln!(output, "Please enter a {}.", field)?;
    }
}

/// Food and amount for one entry, asking only for what was not given up front.
///
/// Questions come in a fixed order: food first, then amount.
pub fn collect_food_and_amount<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    food: Option<String>,
    amount: Option<String>,
) -> Result<(String, String), TrackerError> {
    let given = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    let food = match given(food) {
        Some(food) => food,
        None => ask_nonempty(input, output, "What did you eat? (e.g. 'pizza'): ", "food")?,
    };
    let amount = match given(amount) {
        Some(amount) => amount,
        None => ask_nonempty(input, output, "How much? (e.g. '2 slices', '200g'): ", "amount")?,
    };
    Ok((food, amount))
}
