use std::fmt;

use crate::error::HistoryError;

/// Volatility-relative return bucket for one trading day.
///
/// The alphabet is fixed: positive returns map to A/C/E and negative
/// returns to B/D/F, depending on how many standard deviations the
/// return sits from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Symbol {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Symbol::A),
            'B' => Some(Symbol::B),
            'C' => Some(Symbol::C),
            'D' => Some(Symbol::D),
            'E' => Some(Symbol::E),
            'F' => Some(Symbol::F),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Symbol::A => 'A',
            Symbol::B => 'B',
            Symbol::C => 'C',
            Symbol::D => 'D',
            Symbol::E => 'E',
            Symbol::F => 'F',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Classify a daily return relative to a volatility estimate.
///
/// Buckets (lower bound inclusive, upper bound exclusive, extremes open):
///
/// | condition            | symbol |
/// |----------------------|--------|
/// | ret >= 2σ            | E      |
/// | σ <= ret < 2σ        | C      |
/// | 0 <= ret < σ         | A      |
/// | -σ <= ret < 0        | B      |
/// | -2σ <= ret < -σ      | D      |
/// | ret < -2σ            | F      |
///
/// Total over all real returns and all `std_dev >= 0`. With σ = 0 every
/// non-negative return is E and every negative return is F.
pub fn classify(std_dev: f64, day_return: f64) -> Symbol {
    if day_return >= 2.0 * std_dev {
        Symbol::E
    } else if day_return >= std_dev {
        Symbol::C
    } else if day_return >= 0.0 {
        Symbol::A
    } else if day_return >= -std_dev {
        Symbol::B
    } else if day_return >= -2.0 * std_dev {
        Symbol::D
    } else {
        Symbol::F
    }
}

/// Fixed-width ordered sequence of symbols covering the most recent
/// W classified days. Width is set when the pattern is parsed and never
/// changes; patterns compare by structural equality so they can key the
/// distribution index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern(Vec<Symbol>);

impl Pattern {
    /// Parse a pattern like `"ABAAC"`. Rejects empty strings and
    /// characters outside the A-F alphabet.
    pub fn parse(s: &str) -> Result<Self, HistoryError> {
        if s.is_empty() {
            return Err(HistoryError::EmptyPattern);
        }
        let symbols = s
            .chars()
            .map(|c| Symbol::from_char(c).ok_or(HistoryError::BadSymbol { found: c }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Pattern(symbols))
    }

    pub fn width(&self) -> usize {
        self.0.len()
    }

    /// The most recent symbol in the pattern.
    pub fn last(&self) -> Symbol {
        // Non-empty by construction.
        *self.0.last().unwrap()
    }

    /// Slide the window forward: drop the oldest symbol, append the new
    /// one. Pure; the result has the same width.
    pub fn advance(&self, next: Symbol) -> Pattern {
        let mut symbols = Vec::with_capacity(self.0.len());
        symbols.extend_from_slice(&self.0[1..]);
        symbols.push(next);
        Pattern(symbols)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.0 {
            write!(f, "{}", s.as_char())?;
        }
        Ok(())
    }
}

/// One historical trading day from the tagged-returns table.
///
/// `idx` and `date` are passed through untouched; the simulation only
/// interprets the numeric columns, the tag and the tag pattern.
#[derive(Debug, Clone)]
pub struct Observation {
    pub idx: String,
    pub date: String,
    pub adj_close: f64,
    pub ret: f64,
    /// The return realized the day *after* this observation; this is
    /// what the simulation samples.
    pub next_ret: f64,
    pub abs_ret: f64,
    pub std_dev: f64,
    pub tag: Symbol,
    pub tag_pattern: Pattern,
}

/// One simulated day within one generation.
#[derive(Debug, Clone)]
pub struct Step {
    /// 1-based generation (independent path) number.
    pub generation: u32,
    /// 1-based day within the generation.
    pub day: u32,
    /// Pattern after this day's symbol was appended.
    pub pattern: Pattern,
    /// The sampled return applied on this day.
    pub ret: f64,
    /// Price after applying the sampled return.
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_classify_buckets() {
        let sd = 0.01;
        assert_eq!(classify(sd, 0.025), Symbol::E);
        assert_eq!(classify(sd, 0.015), Symbol::C);
        assert_eq!(classify(sd, 0.005), Symbol::A);
        assert_eq!(classify(sd, -0.005), Symbol::B);
        assert_eq!(classify(sd, -0.015), Symbol::D);
        assert_eq!(classify(sd, -0.025), Symbol::F);
    }

    #[test]
    fn test_classify_boundaries() {
        let sd = 0.01;
        // Lower bound of each bucket is inclusive.
        assert_eq!(classify(sd, 2.0 * sd), Symbol::E);
        assert_eq!(classify(sd, sd), Symbol::C);
        assert_eq!(classify(sd, 0.0), Symbol::A);
        assert_eq!(classify(sd, -sd), Symbol::B);
        assert_eq!(classify(sd, -2.0 * sd), Symbol::D);
    }

    #[test]
    fn test_classify_zero_volatility() {
        // With σ = 0 everything collapses to the extremes.
        assert_eq!(classify(0.0, 0.05), Symbol::E);
        assert_eq!(classify(0.0, 0.0), Symbol::E);
        assert_eq!(classify(0.0, -0.05), Symbol::F);
    }

    #[test]
    fn test_classify_is_total_and_exclusive() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let sd: f64 = rng.gen_range(0.0..0.2);
            let ret: f64 = rng.gen_range(-0.5..0.5);
            let sym = classify(sd, ret);

            // Exactly one of the six predicates holds.
            let predicates = [
                ret >= 2.0 * sd,
                sd <= ret && ret < 2.0 * sd,
                0.0 <= ret && ret < sd,
                -sd <= ret && ret < 0.0,
                -2.0 * sd <= ret && ret < -sd,
                ret < -2.0 * sd,
            ];
            assert_eq!(
                predicates.iter().filter(|&&p| p).count(),
                1,
                "σ={} ret={}",
                sd,
                ret
            );

            let expected = [Symbol::E, Symbol::C, Symbol::A, Symbol::B, Symbol::D, Symbol::F]
                [predicates.iter().position(|&p| p).unwrap()];
            assert_eq!(sym, expected, "σ={} ret={}", sd, ret);
        }
    }

    #[test]
    fn test_pattern_parse_and_display() {
        let p = Pattern::parse("ABFEC").unwrap();
        assert_eq!(p.width(), 5);
        assert_eq!(p.last(), Symbol::C);
        assert_eq!(p.to_string(), "ABFEC");
    }

    #[test]
    fn test_pattern_parse_rejects_bad_input() {
        assert!(Pattern::parse("").is_err());
        assert!(Pattern::parse("ABX").is_err());
        assert!(Pattern::parse("ab").is_err());
    }

    #[test]
    fn test_pattern_advance() {
        let p = Pattern::parse("ABCDE").unwrap();
        let q = p.advance(Symbol::F);
        assert_eq!(q.width(), p.width());
        assert_eq!(q.to_string(), "BCDEF");
        // The original pattern is untouched.
        assert_eq!(p.to_string(), "ABCDE");
    }

    #[test]
    fn test_pattern_advance_width_one() {
        let p = Pattern::parse("A").unwrap();
        assert_eq!(p.advance(Symbol::F).to_string(), "F");
    }
}
