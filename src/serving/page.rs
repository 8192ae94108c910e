//! HTML-форма предсказания

use std::collections::HashMap;
use std::fmt::Write;

use crate::serving::service::{Prediction, PredictionService};
use crate::types::Field;

pub enum Outcome<'a> {
    Blank,
    Estimate(Prediction),
    /// Сообщение и, если известно, поле с ошибкой
    Error(&'a str, Option<Field>),
}

fn label(field: Field) -> &'static str {
    match field {
        Field::Area => "Surface (m²)",
        Field::Rooms => "Nombre de pièces",
        Field::ObservationCount => "Nombre d'observations",
        Field::HousingStock => "Nombre de logements",
        Field::Agglomeration => "Agglomération",
        Field::Zone => "Zone complémentaire",
        Field::HousingType => "Type d'habitat",
        Field::ConstructionEra => "Époque de construction",
        Field::Price | Field::PricePerArea => field.column(),
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Форма с сохранёнными значениями; подсказки для категорий из словаря модели
pub fn render(service: &PredictionService, values: &HashMap<String, String>, outcome: Outcome<'_>) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Estimation du loyer au m²</title>\n</head>\n<body>\n\
         <h1>Estimation du loyer au m²</h1>\n<form method=\"post\" action=\"/predict\">\n",
    );

    let invalid = match outcome {
        Outcome::Error(_, field) => field,
        _ => None,
    };

    for field in Field::INPUT {
        let name = field.column();
        let value = values.get(name).map(String::as_str).unwrap_or_default();
        let vocabulary = service.vocabulary(field);

        let _ = write!(
            html,
            "<p><label for=\"{name}\">{}</label> <input id=\"{name}\" name=\"{name}\" value=\"{}\"",
            escape(label(field)),
            escape(value),
        );
        if invalid == Some(field) {
            html.push_str(" aria-invalid=\"true\" autofocus");
        }
        if field == Field::Rooms || vocabulary.is_empty() {
            html.push_str("></p>\n");
            continue;
        }

        let _ = writeln!(html, " list=\"{name}-options\"></p>");
        let _ = write!(html, "<datalist id=\"{name}-options\">");
        for option in vocabulary {
            let _ = write!(html, "<option value=\"{}\">", escape(option));
        }
        html.push_str("</datalist>\n");
    }

    html.push_str("<p><button type=\"submit\">Estimer</button></p>\n</form>\n");

    match outcome {
        Outcome::Blank => {}
        Outcome::Estimate(prediction) => {
            let _ = write!(
                html,
                "<p class=\"prediction\">Loyer estimé : {:.2} €/m²</p>\n",
                prediction.estimate
            );
            if let Some((low, high)) = prediction.interval {
                let _ = write!(
                    html,
                    "<p class=\"interval\">Intervalle à 95 % : {:.2} – {:.2} €/m²</p>\n",
                    low, high
                );
            }
        }
        Outcome::Error(message, _) => {
            let _ = write!(html, "<p class=\"error\">{}</p>\n", escape(message));
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
    }

    #[test]
    fn labels_cover_every_input_field() {
        for field in Field::INPUT {
            assert_ne!(label(field), field.column());
        }
    }
}
