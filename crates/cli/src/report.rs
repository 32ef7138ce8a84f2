use argmatch::{CommandSet, MatchReport, Parameter};
use serde::Serialize;

/// Resolved state of one parameter after a match pass.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParameterRow {
    pub key: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub set: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Report {
    pub parameters: Vec<ParameterRow>,
    pub unmatched: Vec<String>,
    pub missing_required: Vec<String>,
}

impl Report {
    pub fn collect(set: &CommandSet, report: &MatchReport) -> Self {
        let parameters = set
            .iter()
            .map(|(key, param)| {
                let (value, error) = match param.get_value() {
                    Ok(v) => (Some(v), None),
                    Err(e) => (None, Some(e.to_string())),
                };
                ParameterRow {
                    key: key.clone(),
                    kind: param.kind().to_string(),
                    value,
                    error,
                    origin: param.value_origin().map(|o| o.as_str().to_string()),
                    set: param.is_set(),
                }
            })
            .collect();

        Self {
            parameters,
            unmatched: report
                .unmatched_values()
                .into_iter()
                .map(str::to_string)
                .collect(),
            missing_required: set
                .missing_required()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Plain-text table, one parameter per line.
    pub fn render(&self) -> String {
        let rows: Vec<[String; 4]> = self
            .parameters
            .iter()
            .map(|p| {
                let value = match (&p.value, &p.error) {
                    (Some(v), _) => v.clone(),
                    (None, Some(e)) => format!("<{e}>"),
                    (None, None) => String::new(),
                };
                [
                    p.key.clone(),
                    p.kind.clone(),
                    value,
                    p.origin.clone().unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect();

        let mut widths = [0usize; 3];
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row.iter()) {
                *w = (*w).max(cell.len());
            }
        }

        let mut out = String::new();
        for [key, kind, value, origin] in rows {
            out.push_str(&format!(
                "{:kw$}  {:tw$}  {:vw$}  {}\n",
                key,
                kind,
                value,
                origin,
                kw = widths[0],
                tw = widths[1],
                vw = widths[2],
            ));
        }
        if !self.unmatched.is_empty() {
            out.push_str(&format!("unmatched: {}\n", self.unmatched.join(" ")));
        }
        out
    }
}
