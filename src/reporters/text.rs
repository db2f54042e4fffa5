//! Text (terminal) reporter
//!
//! Spanish output matches the lines the tool has always printed:
//!
//! ```text
//! Archivo 1: A.java
//! Archivo 2: B.java
//! Puntuación de similitud: 0.8125
//! ¿Son similares?: Sí
//! ```

use console::Style;
use std::path::Path;

use crate::config::Locale;
use crate::models::{ComparisonReport, ModelSummary};
use anyhow::Result;

/// Localized fixed strings
struct Labels {
    file_1: &'static str,
    file_2: &'static str,
    score: &'static str,
    similar: &'static str,
    yes: &'static str,
    no: &'static str,
}

fn labels(locale: Locale) -> Labels {
    match locale {
        Locale::Es => Labels {
            file_1: "Archivo 1",
            file_2: "Archivo 2",
            score: "Puntuación de similitud",
            similar: "¿Son similares?",
            yes: "Sí",
            no: "No",
        },
        Locale::En => Labels {
            file_1: "File 1",
            file_2: "File 2",
            score: "Similarity score",
            similar: "Similar?",
            yes: "Yes",
            no: "No",
        },
    }
}

fn paint(text: &str, style: &Style, color: bool) -> String {
    if color {
        style.apply_to(text).force_styling(true).to_string()
    } else {
        text.to_string()
    }
}

/// Render report as terminal output
pub fn render(report: &ComparisonReport, locale: Locale, color: bool) -> Result<String> {
    let l = labels(locale);
    let bold = Style::new().bold();

    let mut out = String::new();
    out.push_str(&format!("{}: {}\n", l.file_1, report.file_a));
    out.push_str(&format!("{}: {}\n", l.file_2, report.file_b));

    match (report.score, report.is_similar) {
        (Some(score), Some(similar)) => {
            let score = format!("{score:.4}");
            out.push_str(&format!("{}: {}\n", l.score, paint(&score, &bold, color)));

            let (answer, style) = if similar {
                (l.yes, Style::new().green().bold())
            } else {
                (l.no, Style::new().yellow())
            };
            out.push_str(&format!("{}: {}\n", l.similar, paint(answer, &style, color)));
        }
        _ => {
            out.push_str(&prediction_failed(locale));
            out.push('\n');
        }
    }

    Ok(out)
}

/// Render a model summary as aligned key/value lines
pub fn render_summary(summary: &ModelSummary) -> Result<String> {
    let rows = [
        ("model", summary.model.clone()),
        ("vectorizer", summary.vectorizer.clone()),
        ("kind", summary.kind.clone()),
        ("capability", summary.capability.clone()),
        ("features", summary.n_features.to_string()),
        (
            "weighting",
            if summary.tfidf { "tf-idf" } else { "counts" }.to_string(),
        ),
    ];
    let mut out = String::new();
    for (key, value) in rows {
        out.push_str(&format!("{key:<11}{value}\n"));
    }
    Ok(out)
}

/// An input file was not found
pub fn missing_file(path: &Path, locale: Locale) -> String {
    match locale {
        Locale::Es => format!("Error: El archivo {} no existe.", path.display()),
        Locale::En => format!("Error: The file {} does not exist.", path.display()),
    }
}

/// A model artifact was not found
pub fn missing_model(path: &Path, locale: Locale) -> String {
    match locale {
        Locale::Es => format!("Error: El modelo {} no existe.", path.display()),
        Locale::En => format!("Error: The model {} does not exist.", path.display()),
    }
}

/// The files could not be read, so no score was produced
pub fn prediction_failed(locale: Locale) -> String {
    match locale {
        Locale::Es => "Error: No se pudo calcular la similitud.".to_string(),
        Locale::En => "Error: The similarity could not be computed.".to_string(),
    }
}
