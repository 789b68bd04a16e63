//! Tagged-block protocol shared by the system prompt and the response parser.
//!
//! The label tables below are the whole protocol surface. The format section of
//! the system prompt is generated from them, so renaming a label here changes
//! both what Rodrigo is told to emit and what the parser accepts.
#![allow(dead_code)]

/// The kinds of structured block Rodrigo can embed in a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Artist,
    Bolo,
    PublishEvent,
}

pub mod artist_labels {
    pub const NAME: &str = "Nombre";
    pub const FORMAT: &str = "Formato";
    pub const STYLE: &str = "Estilo";
    pub const WHY_IT_FITS: &str = "Por qué encaja";
    pub const PRICE_RANGE: &str = "Precio orientativo";
    pub const LINK: &str = "Link";

    pub const ALL: &[&str] = &[NAME, FORMAT, STYLE, WHY_IT_FITS, PRICE_RANGE, LINK];
}

pub mod bolo_labels {
    pub const TITLE: &str = "Título";
    pub const DATE: &str = "Fecha";
    pub const LOCATION: &str = "Ubicación";
    pub const SOUGHT_FORMAT: &str = "Formato buscado";
    pub const FEE_RANGE: &str = "Caché";
    pub const LINK: &str = "Link";

    pub const ALL: &[&str] = &[TITLE, DATE, LOCATION, SOUGHT_FORMAT, FEE_RANGE, LINK];
}

pub mod event_labels {
    pub const TITLE: &str = "Título";
    pub const DATE: &str = "Fecha";
    pub const TIME: &str = "Hora";
    pub const LOCATION: &str = "Ubicación";
    pub const DESCRIPTION: &str = "Descripción";
    pub const CATEGORY: &str = "Tipo";
    pub const GENRES: &str = "Géneros";
    pub const BUDGET: &str = "Presupuesto";

    pub const ALL: &[&str] = &[
        TITLE,
        DATE,
        TIME,
        LOCATION,
        DESCRIPTION,
        CATEGORY,
        GENRES,
        BUDGET,
    ];
}

impl BlockKind {
    pub const ALL: [BlockKind; 3] = [BlockKind::Artist, BlockKind::Bolo, BlockKind::PublishEvent];

    pub fn open_tag(self) -> &'static str {
        match self {
            BlockKind::Artist => "[ARTISTA]",
            BlockKind::Bolo => "[BOLO]",
            BlockKind::PublishEvent => "[PUBLICAR_EVENTO]",
        }
    }

    pub fn close_tag(self) -> &'static str {
        match self {
            BlockKind::Artist => "[/ARTISTA]",
            BlockKind::Bolo => "[/BOLO]",
            BlockKind::PublishEvent => "[/PUBLICAR_EVENTO]",
        }
    }

    pub fn labels(self) -> &'static [&'static str] {
        match self {
            BlockKind::Artist => artist_labels::ALL,
            BlockKind::Bolo => bolo_labels::ALL,
            BlockKind::PublishEvent => event_labels::ALL,
        }
    }

    /// The label a record cannot be built without.
    pub fn primary_label(self) -> &'static str {
        match self {
            BlockKind::Artist => artist_labels::NAME,
            BlockKind::Bolo => bolo_labels::TITLE,
            BlockKind::PublishEvent => event_labels::TITLE,
        }
    }

    fn usage(self) -> &'static str {
        match self {
            BlockKind::Artist => "para cada artista que recomiendes",
            BlockKind::Bolo => "para cada bolo u oportunidad que recomiendes",
            BlockKind::PublishEvent => {
                "una sola vez, cuando el organizador confirme que quiere publicar el evento"
            }
        }
    }
}

/// Labeled values extracted from one block body, keyed by canonical label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockFields {
    values: Vec<(&'static str, String)>,
}

impl BlockFields {
    /// Reads `Label: value` lines from a block body using the vocabulary of `kind`.
    ///
    /// Unknown labels and lines without a colon are skipped. Empty values are
    /// treated as absent. When a label repeats, the first occurrence wins.
    pub fn parse(kind: BlockKind, body: &str) -> Self {
        let mut fields = BlockFields::default();

        for line in body.lines() {
            let Some((raw_label, raw_value)) = split_labeled_line(line) else {
                continue;
            };
            let Some(label) = canonical_label(kind, raw_label) else {
                continue;
            };
            let value = clean_value(raw_value);
            if value.is_empty() || fields.get(label).is_some() {
                continue;
            }
            fields.values.push((label, value.to_string()));
        }

        fields
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn take(&mut self, label: &str) -> Option<String> {
        let idx = self.values.iter().position(|(l, _)| *l == label)?;
        Some(self.values.remove(idx).1)
    }
}

/// Serializes labeled values back into canonical tagged text. Absent values are skipped.
pub fn render_block(kind: BlockKind, values: &[(&str, Option<&str>)]) -> String {
    let mut out = String::from(kind.open_tag());
    out.push('\n');
    for (label, value) in values {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            out.push_str(label);
            out.push_str(": ");
            out.push_str(value.trim());
            out.push('\n');
        }
    }
    out.push_str(kind.close_tag());
    out
}

/// The format section of the system prompt, generated from the label tables.
pub fn format_instructions() -> String {
    let mut out = String::from(
        "FORMATO DE BLOQUES (obligatorio, el sistema los lee de forma automática):\n",
    );

    for kind in BlockKind::ALL {
        out.push_str(&format!(
            "\nUsa este bloque {}:\n{}\n",
            kind.usage(),
            kind.open_tag()
        ));
        for label in kind.labels() {
            out.push_str(&format!("{label}: ...\n"));
        }
        out.push_str(kind.close_tag());
        out.push('\n');
    }

    out.push_str(
        "\nREGLAS DEL FORMATO:\n\
         - Escribe las etiquetas exactamente como aparecen arriba, una por línea.\n\
         - Cierra siempre cada bloque con su etiqueta de cierre.\n\
         - No anides bloques.\n\
         - Si usas el bloque de publicar evento, no incluyas artistas ni bolos en esa respuesta.\n",
    );
    out
}

/// Splits `Label: value`, tolerating list bullets and markdown bold around the label.
fn split_labeled_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("• "))
        .or_else(|| line.strip_prefix("* "))
        .unwrap_or(line);
    let (label, value) = line.split_once(':')?;
    Some((label, value))
}

fn clean_value(raw: &str) -> &str {
    let value = raw.trim();
    let value = value.strip_prefix("**").unwrap_or(value);
    value.strip_suffix("**").unwrap_or(value).trim()
}

fn canonical_label(kind: BlockKind, raw: &str) -> Option<&'static str> {
    let wanted = normalize_label(raw);
    if wanted.is_empty() {
        return None;
    }
    kind.labels()
        .iter()
        .copied()
        .find(|label| normalize_label(label) == wanted)
}

/// Case-, accent- and whitespace-insensitive form of a label.
fn normalize_label(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('*').trim();
    let folded: String = trimmed
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
