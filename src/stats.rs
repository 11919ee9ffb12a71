use std::fmt;

/// Width in bits of the fixed-width encoding used as the savings baseline.
pub const BASELINE_BITS_PER_CHAR: usize = 16;

/// Compression statistics for one decoded message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub bit_count: usize,
    pub total_chars: usize,
    /// `None` when nothing was decoded.
    pub avg_bits_per_char: Option<f64>,
    /// Percentage saved against [`BASELINE_BITS_PER_CHAR`] bits per character,
    /// `None` when nothing was decoded.
    pub space_savings: Option<f64>,
}

impl Statistics {
    /// # Arguments
    ///
    /// * `bit_count` - Length of the encoded bit string.
    /// * `decoded` - The message it decoded to.
    pub fn compute(bit_count: usize, decoded: &str) -> Self {
        let total_chars = decoded.chars().count();
        let (avg_bits_per_char, space_savings) = if total_chars == 0 {
            (None, None)
        } else {
            let baseline = (total_chars * BASELINE_BITS_PER_CHAR) as f64;
            (
                Some(bit_count as f64 / total_chars as f64),
                Some((1.0 - bit_count as f64 / baseline) * 100.0),
            )
        };

        Statistics {
            bit_count,
            total_chars,
            avg_bits_per_char,
            space_savings,
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.avg_bits_per_char {
            Some(avg) => writeln!(f, "Avg bits/char: {avg:.2}")?,
            None => writeln!(f, "Avg bits/char: n/a")?,
        }
        writeln!(f, "Total characters: {}", self.total_chars)?;
        match self.space_savings {
            Some(savings) => write!(f, "Space savings: {savings:.2}%"),
            None => write!(f, "Space savings: n/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_should_average_over_decoded_characters() {
        let stats = Statistics::compute(5, "abc");

        assert_eq!(stats.total_chars, 3);
        assert!((stats.avg_bits_per_char.unwrap() - 5.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn compute_should_measure_savings_against_sixteen_bits() {
        let stats = Statistics::compute(8, "abcd");

        // 8 bits instead of 64
        assert!((stats.space_savings.unwrap() - 87.5).abs() < 1e-9);
    }

    #[test]
    fn compute_should_handle_empty_message() {
        let stats = Statistics::compute(0, "");

        assert_eq!(stats.total_chars, 0);
        assert_eq!(stats.avg_bits_per_char, None);
        assert_eq!(stats.space_savings, None);
    }

    #[test]
    fn display_should_round_to_two_decimals() {
        let stats = Statistics::compute(5, "abc");

        assert_eq!(
            stats.to_string(),
            "Avg bits/char: 1.67\nTotal characters: 3\nSpace savings: 89.58%"
        );
    }
}
