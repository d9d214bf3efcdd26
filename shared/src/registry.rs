//! Static table of the thematic layers the viewer can display.
//!
//! Every entry pairs a layer id (also the TopoJSON file stem) with its class
//! colors and the Italian texts shown in the chooser and the legend. Entry
//! order is the order of the layer chooser, which is what the URL hash
//! foreground index refers to.

/// One thematic layer: class colors (index = class value) and legend texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerEntry {
    pub id: &'static str,
    pub colors: &'static [&'static str],
    pub title: &'static str,
    pub description: &'static str,
    pub labels: &'static [&'static str],
}

/// Fill color for features whose `class` has no registry color.
pub const UNMATCHED_CLASS_COLOR: &str = "#000000";

pub const LAYERS: &[LayerEntry] = &[
    LayerEntry {
        id: "z_score_class",
        colors: &[
            "#313695", "#4575b4", "#74add1", "#abd9e9", "#e0f3f8", "#fee090", "#fdae61", "#f46d43",
            "#d73027", "#a50026",
        ],
        title: "📊🌡️ Scostamento dalla media",
        description: "Indica quanto una zona si discosta dalla media delle temperature urbane.",
        labels: &[
            "Molto più fredda",
            "Più fredda",
            "Fredda",
            "Leggermente fredda",
            "Nella media",
            "Leggermente calda",
            "Calda",
            "Più calda",
            "Molto calda",
            "Estremamente calda",
        ],
    },
    LayerEntry {
        id: "ndvi_class",
        colors: &["#ffffcc", "#c2e699", "#78c679", "#006837"],
        title: "🌿🌱 Presenza di verde",
        description: "Misura la quantità di vegetazione presente (valori alti = più verde).",
        labels: &["Assente", "Poca", "Media", "Molta"],
    },
    LayerEntry {
        id: "albedo_class",
        colors: &["#000000", "#999999", "#cccccc", "#ffffff"],
        title: "☀️⬛⬛ Assorbimento della superficie",
        description: "Indica quanto una superficie assorbe la luce solare: bianco riflette, nero assorbe.",
        labels: &[
            "Molto assorbente",
            "Assorbente",
            "Riflettente",
            "Molto riflettente",
        ],
    },
    LayerEntry {
        id: "heat_ret_class",
        colors: &[
            "#ffffe0", "#ffe08c", "#ffc04d", "#ff9933", "#ff6600", "#cc0000", "#800000",
        ],
        title: "🌡️⏳ Accumulo di calore",
        description: "Quanto una superficie trattiene il calore nel tempo. Indica dove il calore viene assorbito e rilasciato lentamente.",
        labels: &[
            "Molto bassa",
            "Bassa",
            "Moderata",
            "Media",
            "Alta",
            "Molto alta",
            "Estrema",
        ],
    },
    LayerEntry {
        id: "heat_veg_class",
        colors: &["#ffffcc", "#ffeda0", "#feb24c", "#f03b20"],
        title: "🔥🌿 Calore/Vegetazione",
        description: "Relazione tra calore e presenza di vegetazione. Individua dove fa caldo e manca il verde.",
        labels: &["Basso", "Moderato", "Alto", "Molto alto"],
    },
    LayerEntry {
        id: "uhei_class",
        colors: &["#ffffcc", "#ffeda0", "#fd8d3c", "#bd0026"],
        title: "🌇🔥 Esposizione complessiva",
        description: "Esposizione complessiva al calore urbano. Dove il rischio da calore urbano è più elevato.",
        labels: &["Bassa", "Media", "Alta", "Molto alta"],
    },
    LayerEntry {
        id: "delta_lst_class",
        colors: &[
            "#30123b", "#4662d8", "#35abf8", "#1be5b5", "#74fe5d", "#c9ef34", "#fbb938", "#f56918",
            "#c92903", "#7a0403",
        ],
        title: "🌞🌙🌡️ Escursione termica della superficie",
        description: "Variazione della temperatura superficiale tra giorno e notte.",
        labels: &[
            "Freddo notte",
            "Meno caldo",
            "Neutro",
            "Leggero caldo",
            "Moderato caldo",
            "Caldo",
            "Piuttosto Caldo",
            "Molto caldo",
            "Estremo",
            "Estremamente caldo",
        ],
    },
];

/// Look up a layer by id.
pub fn layer(id: &str) -> Option<&'static LayerEntry> {
    LAYERS.iter().find(|entry| entry.id == id)
}

impl LayerEntry {
    /// Path of the TopoJSON resource, relative to the page.
    pub fn resource_path(&self) -> String {
        format!("topojson/{}.topojson", self.id)
    }
}

/// One option of the layer chooser: a registry layer, or the trailing
/// "no layer" option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerChoice {
    Layer(&'static LayerEntry),
    Nothing,
}

pub const NO_LAYER_LABEL: &str = "Nessun layer";

impl LayerChoice {
    /// Number of options in the chooser.
    pub const COUNT: usize = LAYERS.len() + 1;

    pub fn at(index: usize) -> Option<Self> {
        match LAYERS.get(index) {
            Some(entry) => Some(Self::Layer(entry)),
            None if index == LAYERS.len() => Some(Self::Nothing),
            None => None,
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).filter_map(Self::at)
    }

    /// Parse the `<option>` value; the empty string is "no layer".
    pub fn from_value(value: &str) -> Option<Self> {
        if value.is_empty() {
            return Some(Self::Nothing);
        }
        layer(value).map(Self::Layer)
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Layer(entry) => LAYERS
                .iter()
                .position(|candidate| candidate.id == entry.id)
                .unwrap_or(LAYERS.len()),
            Self::Nothing => LAYERS.len(),
        }
    }

    pub fn value(&self) -> &'static str {
        match self {
            Self::Layer(entry) => entry.id,
            Self::Nothing => "",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Layer(entry) => entry.title,
            Self::Nothing => NO_LAYER_LABEL,
        }
    }

    pub fn entry(&self) -> Option<&'static LayerEntry> {
        match self {
            Self::Layer(entry) => Some(*entry),
            Self::Nothing => None,
        }
    }
}

impl Default for LayerChoice {
    fn default() -> Self {
        Self::Layer(&LAYERS[0])
    }
}
