//! Display helpers for answers and SQL logs

use crate::agent::{AgentAnswer, AnswerStatus};

/// Split SQL into words, keeping quoted strings and identifiers whole
fn tokenize(sql: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in sql.chars() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None if ch.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => {
                if matches!(ch, '\'' | '"' | '`') {
                    quote = Some(ch);
                }
                current.push(ch);
            }
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Number of tokens starting a clause at this position, if any
fn clause_len(word: &str, next: Option<&str>) -> Option<usize> {
    let word = word.to_uppercase();
    let next = next.map(|n| n.to_uppercase());
    match (word.as_str(), next.as_deref()) {
        ("GROUP" | "ORDER", Some("BY"))
        | ("LEFT" | "RIGHT" | "INNER" | "FULL" | "CROSS", Some("JOIN"))
        | ("UNION", Some("ALL")) => Some(2),
        ("SELECT" | "FROM" | "WHERE" | "HAVING" | "LIMIT" | "JOIN" | "UNION", _) => Some(1),
        _ => None,
    }
}

/// Put each major clause on its own line with an upper-case keyword
pub fn format_sql(sql: &str) -> String {
    let tokens = tokenize(sql);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < tokens.len() {
        match clause_len(&tokens[i], tokens.get(i + 1).map(String::as_str)) {
            Some(n) => {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current = tokens[i..i + n]
                    .iter()
                    .map(|t| t.to_uppercase())
                    .collect::<Vec<_>>()
                    .join(" ");
                i += n;
            }
            None => {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(&tokens[i]);
                i += 1;
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Numbered, formatted SQL statements
pub fn format_sql_log(sql_log: &[String]) -> String {
    if sql_log.is_empty() {
        return "No SQL was executed.".to_string();
    }

    sql_log
        .iter()
        .enumerate()
        .map(|(i, sql)| format!("-- [{}]\n{}", i + 1, format_sql(sql)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Answer text with a short footer about the SQL behind it
pub fn format_answer(answer: &AgentAnswer) -> String {
    let mut output = answer.text.clone();
    let note = match answer.status {
        AnswerStatus::Done => None,
        AnswerStatus::Recovered => Some("answer recovered from unformatted model output"),
        AnswerStatus::Failed => Some("answer incomplete"),
    };

    let count = answer.sql_log.len();
    let footer = match (count, note) {
        (0, None) => None,
        (0, Some(n)) => Some(format!("({})", n)),
        (c, None) => Some(format!("({} SQL statement(s), type 'sql' to view)", c)),
        (c, Some(n)) => Some(format!("({}; {} SQL statement(s), type 'sql' to view)", n, c)),
    };

    if let Some(footer) = footer {
        output.push_str("\n\n");
        output.push_str(&footer);
    }
    output
}
