use std::borrow::Cow;

use crate::registry::{self, LayerEntry};

/// Legend content for one thematic layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Legend {
    pub layer_id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub rows: Vec<LegendRow>,
}

/// A color swatch and its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendRow {
    pub color: &'static str,
    pub label: Cow<'static, str>,
}

/// Legend for a registry layer, `None` for an unknown id.
pub fn render(layer_id: &str) -> Option<Legend> {
    registry::layer(layer_id).map(render_entry)
}

/// One row per color. Colors without a label get a numbered placeholder.
pub fn render_entry(entry: &'static LayerEntry) -> Legend {
    let rows = entry
        .colors
        .iter()
        .enumerate()
        .map(|(index, &color)| LegendRow {
            color,
            label: entry
                .labels
                .get(index)
                .map(|label| Cow::Borrowed(*label))
                .unwrap_or_else(|| Cow::Owned(format!("Classe {index}"))),
        })
        .collect();

    Legend {
        layer_id: entry.id,
        title: entry.title,
        description: entry.description,
        rows,
    }
}
