use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tag identifying which numeric rule produced a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternType {
    Arithmetic,
    Geometric,
    Powers,
    Squares,
    Fibonacci,
    Tribonacci,
    Lucas,
    Alternating,
    Polynomial,
    Factorial,
    Prime,
    Catalan,
    Collatz,
    DigitalRoot,
    Modular,
    Hexagonal,
    CenteredTriangle,
    Cubic,
    Tetrahedral,
}

impl PatternType {
    pub fn hint(&self) -> &'static str {
        match self {
            PatternType::Arithmetic => "Look for a constant difference between consecutive numbers",
            PatternType::Geometric => "Check if each number is multiplied by the same value",
            PatternType::Fibonacci => "Each number might be the sum of previous numbers",
            PatternType::Powers => "Consider exponential growth patterns",
            PatternType::Squares => "Think about perfect squares",
            PatternType::Prime => "These might be prime numbers",
            PatternType::Factorial => "Consider factorial sequences (n!)",
            PatternType::Alternating => "Look for alternating patterns",
            PatternType::Polynomial => "This might follow a quadratic pattern",
            PatternType::Tribonacci => "Each number is the sum of the three preceding ones",
            PatternType::Lucas => "Similar to Fibonacci but with different starting values",
            PatternType::Catalan => "These are Catalan numbers",
            PatternType::Collatz => "Apply the 3n+1 rule for odd numbers, n/2 for even",
            PatternType::DigitalRoot => "Consider the sum of digits",
            PatternType::Modular => "Look for patterns in remainders",
            PatternType::Hexagonal
            | PatternType::CenteredTriangle
            | PatternType::Cubic
            | PatternType::Tetrahedral => "Look for mathematical relationships between the numbers",
        }
    }
}

/// A generated puzzle: the visible terms plus the single correct next term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub numbers: Vec<i64>,
    pub answer: i64,
    pub description: String,
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
}

impl Pattern {
    pub fn check(&self, answer: i64) -> bool {
        self.answer == answer
    }
}

/// One entry of the level-ordered generator table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternFamily {
    Arithmetic,
    SignedArithmetic,
    Geometric,
    Powers,
    Squares,
    Fibonacci,
    Tribonacci,
    Lucas,
    Alternating,
    Polynomial,
    Factorial,
    Prime,
    Catalan,
    Collatz,
    DigitalRoot,
    Modular,
    Hexagonal,
    CenteredTriangle,
    Cubic,
    Tetrahedral,
}

const FACTORIAL_CAP: usize = 7;
const PRIME_CAP: usize = 20;

// One prime past the display cap so a full list still has a next term
const PRIMES: [i64; PRIME_CAP + 1] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73,
];

const CATALAN: [i64; 8] = [1, 1, 2, 5, 14, 42, 132, 429];

impl PatternFamily {
    pub const ORDERED: [PatternFamily; 20] = [
        PatternFamily::Arithmetic,
        PatternFamily::SignedArithmetic,
        PatternFamily::Geometric,
        PatternFamily::Powers,
        PatternFamily::Squares,
        PatternFamily::Fibonacci,
        PatternFamily::Tribonacci,
        PatternFamily::Lucas,
        PatternFamily::Alternating,
        PatternFamily::Polynomial,
        PatternFamily::Factorial,
        PatternFamily::Prime,
        PatternFamily::Catalan,
        PatternFamily::Collatz,
        PatternFamily::DigitalRoot,
        PatternFamily::Modular,
        PatternFamily::Hexagonal,
        PatternFamily::CenteredTriangle,
        PatternFamily::Cubic,
        PatternFamily::Tetrahedral,
    ];

    /// Levels 1..=20 walk the table in order; every later level reuses the last family.
    pub fn for_level(level: u32) -> PatternFamily {
        let index = (level.saturating_sub(1) as usize).min(Self::ORDERED.len() - 1);
        Self::ORDERED[index]
    }

    pub fn pattern_type(&self) -> PatternType {
        match self {
            PatternFamily::Arithmetic | PatternFamily::SignedArithmetic => PatternType::Arithmetic,
            PatternFamily::Geometric => PatternType::Geometric,
            PatternFamily::Powers => PatternType::Powers,
            PatternFamily::Squares => PatternType::Squares,
            PatternFamily::Fibonacci => PatternType::Fibonacci,
            PatternFamily::Tribonacci => PatternType::Tribonacci,
            PatternFamily::Lucas => PatternType::Lucas,
            PatternFamily::Alternating => PatternType::Alternating,
            PatternFamily::Polynomial => PatternType::Polynomial,
            PatternFamily::Factorial => PatternType::Factorial,
            PatternFamily::Prime => PatternType::Prime,
            PatternFamily::Catalan => PatternType::Catalan,
            PatternFamily::Collatz => PatternType::Collatz,
            PatternFamily::DigitalRoot => PatternType::DigitalRoot,
            PatternFamily::Modular => PatternType::Modular,
            PatternFamily::Hexagonal => PatternType::Hexagonal,
            PatternFamily::CenteredTriangle => PatternType::CenteredTriangle,
            PatternFamily::Cubic => PatternType::Cubic,
            PatternFamily::Tetrahedral => PatternType::Tetrahedral,
        }
    }

    pub fn generate<R: Rng + ?Sized>(&self, level: u32, length: usize, rng: &mut R) -> Pattern {
        let level = level.max(1) as i64;
        let length = length.max(1);
        let pattern_type = self.pattern_type();

        let (numbers, answer, description) = match self {
            PatternFamily::Arithmetic => arithmetic(level, length, false, rng),
            PatternFamily::SignedArithmetic => arithmetic(level, length, true, rng),
            PatternFamily::Geometric => {
                let start = rng.gen_range(1..=5i64);
                let ratio = rng.gen_range(2..=4i64);
                let (numbers, answer) =
                    indexed(0, length, |i| start.saturating_mul(saturating_pow(ratio, i)));
                (numbers, answer, format!("Multiply by {} each time", ratio))
            }
            PatternFamily::Powers => {
                let base = rng.gen_range(2..=4i64);
                let (numbers, answer) = indexed(1, length, |i| saturating_pow(base, i));
                (numbers, answer, format!("Powers of {}", base))
            }
            PatternFamily::Squares => {
                let start = rng.gen_range(1..=5i64);
                let (numbers, answer) = indexed(0, length, |i| {
                    let n = start.saturating_add(i);
                    n.saturating_mul(n)
                });
                (numbers, answer, "Perfect squares sequence".to_string())
            }
            PatternFamily::Fibonacci => {
                let a = rng.gen_range(1..=3i64);
                let b = rng.gen_range(1..=3i64);
                let (numbers, answer) = recurrence(&[a, b], length);
                (numbers, answer, "Fibonacci-like sequence".to_string())
            }
            PatternFamily::Tribonacci => {
                let (numbers, answer) = recurrence(&[1, 1, 2], length);
                (numbers, answer, "Sum of previous three numbers".to_string())
            }
            PatternFamily::Lucas => {
                let (numbers, answer) = recurrence(&[2, 1], length);
                (numbers, answer, "Lucas sequence".to_string())
            }
            PatternFamily::Alternating => {
                let base = rng.gen_range(5..=14i64);
                let diff = rng.gen_range(2..=6i64);
                let (numbers, answer) = indexed(0, length, |i| {
                    let offset = i.saturating_mul(diff);
                    if i % 2 == 0 {
                        base.saturating_add(offset)
                    } else {
                        base.saturating_sub(offset)
                    }
                });
                (numbers, answer, "Alternating add/subtract pattern".to_string())
            }
            PatternFamily::Polynomial => {
                let a = rng.gen_range(1..=3i64);
                let b = rng.gen_range(0..=4i64);
                let c = rng.gen_range(0..=4i64);
                let (numbers, answer) = indexed(1, length, |i| {
                    a.saturating_mul(i.saturating_mul(i))
                        .saturating_add(b.saturating_mul(i))
                        .saturating_add(c)
                });
                (numbers, answer, "Quadratic sequence".to_string())
            }
            PatternFamily::Factorial => {
                let numbers: Vec<i64> = (1..=length.min(FACTORIAL_CAP) as i64).map(factorial).collect();
                // Next term is taken from the displayed count, as the game always has
                let answer = factorial(numbers.len() as i64 + 1);
                (numbers, answer, "Factorial sequence (n!)".to_string())
            }
            PatternFamily::Prime => {
                let numbers = PRIMES[..length.min(PRIME_CAP)].to_vec();
                let answer = PRIMES[numbers.len()];
                (numbers, answer, "Prime numbers sequence".to_string())
            }
            PatternFamily::Catalan => {
                let numbers = CATALAN[..length.min(CATALAN.len())].to_vec();
                // Index is clamped, so a full table repeats its last value as the answer
                let answer = CATALAN[length.min(CATALAN.len() - 1)];
                (numbers, answer, "Catalan numbers".to_string())
            }
            PatternFamily::Collatz => {
                let mut current = rng.gen_range(10..=29i64);
                let mut numbers = vec![current];
                while numbers.len() < length && current != 1 {
                    current = collatz_step(current);
                    numbers.push(current);
                }
                (numbers, collatz_step(current), "Collatz conjecture sequence".to_string())
            }
            PatternFamily::DigitalRoot => {
                let mut current = rng.gen_range(10..=109i64);
                let mut numbers = Vec::with_capacity(length);
                for _ in 0..length {
                    numbers.push(current);
                    while current >= 10 {
                        current = digit_sum(current);
                    }
                    current = current * 10 + rng.gen_range(0..=9i64);
                }
                // Fixed offset, not a true digital-root continuation
                let answer = numbers.last().copied().unwrap_or(0).saturating_add(11);
                (numbers, answer, "Digital root pattern".to_string())
            }
            PatternFamily::Modular => {
                let modulus = rng.gen_range(3..=7i64);
                let multiplier = rng.gen_range(2..=4i64);
                let (numbers, answer) =
                    indexed(1, length, |i| i.saturating_mul(multiplier) % modulus);
                (numbers, answer, format!("Modular arithmetic (mod {})", modulus))
            }
            PatternFamily::Hexagonal => {
                let (numbers, answer) =
                    indexed(1, length, |i| i.saturating_mul(i.saturating_mul(2) - 1));
                (numbers, answer, "Hexagonal number sequence".to_string())
            }
            PatternFamily::CenteredTriangle => {
                let (numbers, answer) = indexed(1, length, |i| {
                    (3i64.saturating_mul(i).saturating_mul(i) - 3 * i + 2) / 2
                });
                (numbers, answer, "Centered triangular numbers".to_string())
            }
            PatternFamily::Cubic => {
                let (numbers, answer) = indexed(1, length, |i| saturating_pow(i, 3));
                (numbers, answer, "Cubic number sequence".to_string())
            }
            PatternFamily::Tetrahedral => {
                let (numbers, answer) = indexed(1, length, |i| {
                    i.saturating_mul(i + 1).saturating_mul(i + 2) / 6
                });
                (numbers, answer, "Tetrahedral number sequence".to_string())
            }
        };

        Pattern {
            numbers,
            answer,
            description,
            pattern_type,
        }
    }
}

/// Generate a sequence puzzle of `length` visible terms for the given level.
///
/// The family is chosen by level alone; starting values and coefficients are
/// drawn from `rng`, so a seeded generator reproduces the same puzzle.
pub fn generate_sequence_pattern<R: Rng + ?Sized>(level: u32, length: usize, rng: &mut R) -> Pattern {
    PatternFamily::for_level(level).generate(level, length, rng)
}

fn arithmetic<R: Rng + ?Sized>(
    level: i64,
    length: usize,
    signed: bool,
    rng: &mut R,
) -> (Vec<i64>, i64, String) {
    let start = rng.gen_range(1..=level.saturating_mul(2));
    let mut diff = rng.gen_range(1..=level);
    if signed && rng.gen_bool(0.5) {
        diff = -diff;
    }

    let (numbers, answer) = indexed(0, length, |i| start.saturating_add(i.saturating_mul(diff)));
    let description = if diff > 0 {
        format!("Add {} each time", diff)
    } else {
        format!("Subtract {} each time", diff.abs())
    };
    (numbers, answer, description)
}

/// Evaluate `term` for `length + 1` consecutive indices starting at `first`,
/// returning the visible terms and the next one.
fn indexed(first: i64, length: usize, term: impl Fn(i64) -> i64) -> (Vec<i64>, i64) {
    let mut numbers: Vec<i64> = (0..=length as i64).map(|i| term(first + i)).collect();
    let answer = numbers.pop().unwrap_or_default();
    (numbers, answer)
}

/// Extend `seed` with the sum of the previous `seed.len()` terms.
fn recurrence(seed: &[i64], length: usize) -> (Vec<i64>, i64) {
    let order = seed.len();
    let mut terms = seed.to_vec();
    while terms.len() <= length {
        let next = terms[terms.len() - order..]
            .iter()
            .fold(0i64, |acc, n| acc.saturating_add(*n));
        terms.push(next);
    }
    let answer = terms[length];
    terms.truncate(length);
    (terms, answer)
}

fn saturating_pow(base: i64, exp: i64) -> i64 {
    base.saturating_pow(exp.clamp(0, u32::MAX as i64) as u32)
}

fn factorial(n: i64) -> i64 {
    (1..=n).fold(1i64, |acc, k| acc.saturating_mul(k))
}

fn collatz_step(n: i64) -> i64 {
    if n % 2 == 0 {
        n / 2
    } else {
        n.saturating_mul(3).saturating_add(1)
    }
}

fn digit_sum(mut n: i64) -> i64 {
    let mut sum = 0;
    while n > 0 {
        sum += n % 10;
        n /= 10;
    }
    sum
}
