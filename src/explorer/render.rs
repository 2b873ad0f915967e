use itertools::Itertools;
use crate::{Row, DISPLAY_PREFIXES};

/// Human label for a table: `dw_player_origin` → `DW: Player Origin`.
pub fn display_name(table: &str) -> String {
    let mut name = table.to_string();
    for (prefix, replacement) in DISPLAY_PREFIXES.iter() {
        name = name.replace(prefix, replacement);
    }
    capitalize_words(&name.replace('_', " "))
}

/// Human label for a column: `home_runs` → `Home Runs`.
pub fn column_label(column: &str) -> String {
    capitalize_words(&column.replace('_', " "))
}

fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .join(" ")
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// On-screen table fragment. Nulls render as the literal `NULL`.
pub fn html_table(caption: &str, columns: &[String], rows: &[Row]) -> String {
    let mut html = String::from("<table>");
    html.push_str(&format!("<caption>{}</caption>", escape_html(caption)));

    html.push_str("<thead><tr>");
    for column in columns {
        html.push_str(&format!("<th>{}</th>", escape_html(&column_label(column))));
    }
    html.push_str("</tr></thead><tbody>");

    for row in rows {
        html.push_str("<tr>");
        for column in columns {
            let text = row
                .get(column)
                .and_then(|v| v.to_text())
                .unwrap_or_else(|| "NULL".to_string());
            html.push_str(&format!("<td>{}</td>", escape_html(&text)));
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table>");
    html
}
