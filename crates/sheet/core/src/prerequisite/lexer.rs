//! Tokenizer for prerequisite expressions.
//!
//! Trait names may contain spaces and punctuation ("Fleet of Foot",
//! "Fighting Style: Boxing"), so names are recognised by matching the known
//! name list longest-first instead of splitting on whitespace. A match only
//! counts when it starts and ends at a word boundary, which keeps "Fight"
//! from matching inside "Firefight".

use core::fmt;

use crate::prerequisite::PrerequisiteError;
use crate::state::TraitType;

/// Comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
pub enum CompareOp {
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = "<=")]
    LessEqual,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = ">=")]
    GreaterEqual,
    #[strum(serialize = "==")]
    Equal,
    #[strum(serialize = "!=")]
    NotEqual,
}

impl CompareOp {
    pub fn apply(self, left: i32, right: i32) -> bool {
        match self {
            Self::Less => left < right,
            Self::LessEqual => left <= right,
            Self::Greater => left > right,
            Self::GreaterEqual => left >= right,
            Self::Equal => left == right,
            Self::NotEqual => left != right,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Number(i32),
    /// Reference to a trait's rating, optionally qualified by type (`Power.Animalism`).
    Trait {
        trait_type: Option<TraitType>,
        name: String,
    },
    /// `Name.Specialty`: whether the trait holds the specialty.
    Specialty {
        trait_type: Option<TraitType>,
        name: String,
        specialty: String,
    },
    Powerstat,
    Compare(CompareOp),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "number {n}"),
            Self::Trait { name, .. } => write!(f, "trait '{name}'"),
            Self::Specialty {
                name, specialty, ..
            } => write!(f, "specialty '{name}.{specialty}'"),
            Self::Powerstat => f.write_str("power stat"),
            Self::Compare(op) => write!(f, "'{op}'"),
            Self::And => f.write_str("'and'"),
            Self::Or => f.write_str("'or'"),
            Self::Not => f.write_str("'not'"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
        }
    }
}

/// Splits `text` into tokens.
///
/// `names` lists every referenceable trait name with its type, longest names
/// first. `powerstat` is the identifier that stands for the power stat.
pub fn tokenize(
    text: &str,
    names: &[(&str, TraitType)],
    powerstat: &str,
) -> Result<Vec<Token>, PrerequisiteError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(c) = text[pos..].chars().next() {
        let rest = &text[pos..];

        if c.is_whitespace() {
            pos += c.len_utf8();
            continue;
        }

        match c {
            '(' => {
                tokens.push(Token::LParen);
                pos += 1;
                continue;
            }
            ')' => {
                tokens.push(Token::RParen);
                pos += 1;
                continue;
            }
            '<' | '>' | '=' | '!' => {
                let (op, len) =
                    compare_op(rest).ok_or(PrerequisiteError::UnexpectedCharacter {
                        offset: pos,
                        ch: c,
                    })?;
                tokens.push(Token::Compare(op));
                pos += len;
                continue;
            }
            '0'..='9' => {
                let len = rest
                    .find(|ch: char| !ch.is_ascii_digit())
                    .unwrap_or(rest.len());
                let digits = &rest[..len];
                let n = digits
                    .parse()
                    .map_err(|_| PrerequisiteError::NumberOutOfRange(digits.to_string()))?;
                tokens.push(Token::Number(n));
                pos += len;
                continue;
            }
            _ => {}
        }

        if !starts_word(text, pos) {
            return Err(PrerequisiteError::UnknownReference(word_at(rest).to_string()));
        }
        let (token, len) = read_word(rest, names, powerstat)
            .ok_or_else(|| PrerequisiteError::UnknownReference(word_at(rest).to_string()))?;
        tokens.push(token);
        pos += len;
    }

    Ok(tokens)
}

fn compare_op(rest: &str) -> Option<(CompareOp, usize)> {
    const OPS: [(&str, CompareOp); 6] = [
        ("<=", CompareOp::LessEqual),
        (">=", CompareOp::GreaterEqual),
        ("==", CompareOp::Equal),
        ("!=", CompareOp::NotEqual),
        ("<", CompareOp::Less),
        (">", CompareOp::Greater),
    ];
    OPS.iter()
        .find(|(text, _)| rest.starts_with(text))
        .map(|(text, op)| (*op, text.len()))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn starts_word(text: &str, pos: usize) -> bool {
    text[..pos].chars().next_back().is_none_or(|c| !is_word_char(c))
}

fn ends_word(rest: &str, len: usize) -> bool {
    rest[len..].chars().next().is_none_or(|c| !is_word_char(c))
}

/// Text up to the next delimiter, used in error messages.
fn word_at(rest: &str) -> &str {
    let end = rest
        .find(|c: char| c.is_whitespace() || "()<>=!".contains(c))
        .unwrap_or(rest.len());
    &rest[..end]
}

fn longest_name<'n>(
    rest: &str,
    names: &[(&'n str, TraitType)],
    trait_type: Option<TraitType>,
) -> Option<&'n str> {
    names
        .iter()
        .filter(|(_, t)| trait_type.is_none_or(|wanted| wanted == *t))
        .map(|(name, _)| *name)
        .find(|name| !name.is_empty() && rest.starts_with(name) && ends_word(rest, name.len()))
}

fn read_word(rest: &str, names: &[(&str, TraitType)], powerstat: &str) -> Option<(Token, usize)> {
    // `Type.Name` takes precedence when the qualified name exists.
    for trait_type in TraitType::ALL {
        let prefix = trait_type.as_ref();
        let Some(after) = rest
            .strip_prefix(prefix)
            .and_then(|r| r.strip_prefix('.'))
        else {
            continue;
        };
        if let Some(name) = longest_name(after, names, Some(trait_type)) {
            let len = prefix.len() + 1 + name.len();
            return Some(with_specialty(rest, Some(trait_type), name, len));
        }
    }

    let mut best: Option<(Token, usize)> = None;
    let mut consider = |token: Token, len: usize| {
        if best.as_ref().is_none_or(|(_, l)| len > *l) {
            best = Some((token, len));
        }
    };

    for (keyword, token) in [("and", Token::And), ("or", Token::Or), ("not", Token::Not)] {
        if rest.starts_with(keyword) && ends_word(rest, keyword.len()) {
            consider(token, keyword.len());
        }
    }
    if !powerstat.is_empty() && rest.starts_with(powerstat) && ends_word(rest, powerstat.len()) {
        consider(Token::Powerstat, powerstat.len());
    }
    if let Some(name) = longest_name(rest, names, None) {
        let (token, len) = with_specialty(rest, None, name, name.len());
        consider(token, len);
    }

    best
}

/// Extends a name match with a `.Specialty` suffix when present.
fn with_specialty(
    rest: &str,
    trait_type: Option<TraitType>,
    name: &str,
    len: usize,
) -> (Token, usize) {
    let suffix = &rest[len..];
    if let Some(after_dot) = suffix.strip_prefix('.')
        && after_dot.chars().next().is_some_and(is_word_char)
    {
        let end = after_dot
            .find(|c: char| c.is_whitespace() || "()<>=!".contains(c))
            .unwrap_or(after_dot.len());
        let token = Token::Specialty {
            trait_type,
            name: name.to_string(),
            specialty: after_dot[..end].to_string(),
        };
        return (token, len + 1 + end);
    }

    let token = Token::Trait {
        trait_type,
        name: name.to_string(),
    };
    (token, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: [(&str, TraitType); 6] = [
        ("Fleet of Foot", TraitType::Merit),
        ("Animalism", TraitType::Power),
        ("Firefight", TraitType::Skill),
        ("Larceny", TraitType::Skill),
        ("Fight", TraitType::Skill),
        ("Wits", TraitType::Attribute),
    ];

    fn lex(text: &str) -> Result<Vec<Token>, PrerequisiteError> {
        tokenize(text, &NAMES, "Powerstat")
    }

    fn trait_token(name: &str) -> Token {
        Token::Trait {
            trait_type: None,
            name: name.to_string(),
        }
    }

    #[test]
    fn tokenizes_comparison_and_connectives() {
        let tokens = lex("Wits > 2 and (Larceny >= 1 or Powerstat == 3)").unwrap();
        assert_eq!(
            tokens,
            vec![
                trait_token("Wits"),
                Token::Compare(CompareOp::Greater),
                Token::Number(2),
                Token::And,
                Token::LParen,
                trait_token("Larceny"),
                Token::Compare(CompareOp::GreaterEqual),
                Token::Number(1),
                Token::Or,
                Token::Powerstat,
                Token::Compare(CompareOp::Equal),
                Token::Number(3),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn longer_names_win_over_embedded_shorter_ones() {
        assert_eq!(lex("Firefight > 1").unwrap()[0], trait_token("Firefight"));
        assert_eq!(lex("Fight > 1").unwrap()[0], trait_token("Fight"));
    }

    #[test]
    fn multi_word_names_are_single_tokens() {
        let tokens = lex("Fleet of Foot>0").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], trait_token("Fleet of Foot"));
    }

    #[test]
    fn dotted_suffix_becomes_specialty_reference() {
        let tokens = lex("Larceny.Lockpicking and Wits > 1").unwrap();
        assert_eq!(
            tokens[0],
            Token::Specialty {
                trait_type: None,
                name: "Larceny".into(),
                specialty: "Lockpicking".into(),
            }
        );
        assert_eq!(tokens[1], Token::And);
    }

    #[test]
    fn type_prefix_qualifies_reference() {
        let tokens = lex("(Power.Animalism > 1)").unwrap();
        assert_eq!(
            tokens[1],
            Token::Trait {
                trait_type: Some(TraitType::Power),
                name: "Animalism".into(),
            }
        );
    }

    #[test]
    fn partial_word_is_unknown() {
        assert_eq!(
            lex("Witsy > 1"),
            Err(PrerequisiteError::UnknownReference("Witsy".into()))
        );
        assert!(matches!(
            lex("Wits = 1"),
            Err(PrerequisiteError::UnexpectedCharacter { ch: '=', .. })
        ));
    }
}
