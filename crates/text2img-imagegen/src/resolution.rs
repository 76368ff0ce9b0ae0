//! Aspect ratio to image size tables
//!
//! Each provider accepts a different set of sizes depending on the model
//! family. Tables map a ratio label such as `"16:9"` to three size strings
//! ordered small, medium, large. The model family is detected by
//! case-insensitive substring markers; unknown models get a generic table.

/// Sizes for one ratio, ordered small, medium, large
pub type SizeTiers = &'static [&'static str];

/// Requested output quality
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Quality {
    /// `s`
    Small,
    /// `m`
    #[default]
    Medium,
    /// `h`
    High,
}

impl Quality {
    /// Parse the single-letter form used in chat commands
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "s" => Some(Self::Small),
            "m" => Some(Self::Medium),
            "h" => Some(Self::High),
            _ => None,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Small => "s",
            Self::Medium => "m",
            Self::High => "h",
        }
    }

    /// Position in a [`SizeTiers`] list
    pub const fn index(self) -> usize {
        match self {
            Self::Small => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Ordered ratio to size mapping for one model family
#[derive(Debug)]
pub struct ResolutionTable {
    entries: &'static [(&'static str, SizeTiers)],
}

impl ResolutionTable {
    const fn new(entries: &'static [(&'static str, SizeTiers)]) -> Self {
        Self { entries }
    }

    /// Sizes for `ratio`, if the ratio is supported
    pub fn get(&self, ratio: &str) -> Option<&'static [&'static str]> {
        self.entries
            .iter()
            .find(|(label, _)| *label == ratio)
            .map(|(_, sizes)| *sizes)
    }

    pub fn contains(&self, ratio: &str) -> bool {
        self.get(ratio).is_some()
    }

    /// Supported ratio labels in table order
    pub fn ratios(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(label, _)| *label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static [&'static str])> + '_ {
        self.entries.iter().map(|(label, sizes)| (*label, *sizes))
    }

    /// Size string for `ratio` at `quality`
    ///
    /// The quality index is clamped to the last available size, so a
    /// shorter list still yields its largest entry for `High`. An empty
    /// list yields `None`.
    pub fn select(&self, ratio: &str, quality: Quality) -> Option<&'static str> {
        let sizes = self.get(ratio)?;
        let index = quality.index().min(sizes.len().checked_sub(1)?);
        sizes.get(index).copied()
    }
}

fn model_matches(model: &str, markers: &[&str]) -> bool {
    let model = model.to_lowercase();
    markers.iter().any(|marker| model.contains(marker))
}

/// Table for a Gitee AI model
pub fn gitee(model: &str) -> &'static ResolutionTable {
    if model_matches(model, &["qwen-image"]) {
        &GITEE_QWEN_IMAGE
    } else if model_matches(model, &["z-image-turbo"]) {
        &GITEE_Z_IMAGE_TURBO
    } else if model_matches(model, &["flux"]) {
        &GITEE_FLUX
    } else {
        &GITEE_GENERIC
    }
}

/// Table for an Aliyun Bailian model
pub fn aliyun(model: &str) -> &'static ResolutionTable {
    if model_matches(model, &["qwen-image"]) {
        &ALIYUN_QWEN_IMAGE
    } else if model_matches(model, &["z-image-turbo"]) {
        &ALIYUN_Z_IMAGE_TURBO
    } else if model_matches(model, &["wan"]) {
        &ALIYUN_WAN
    } else {
        &ALIYUN_GENERIC
    }
}

/// Table for a Volcengine Seedream model; unknown versions use the 4.5 table
pub fn volcengine(model: &str) -> &'static ResolutionTable {
    if model_matches(model, &["4-5", "4.5"]) {
        &SEEDREAM_4_5
    } else if model_matches(model, &["4-0", "4.0"]) {
        &SEEDREAM_4_0
    } else if model_matches(model, &["3-0", "3.0"]) {
        &SEEDREAM_3_0
    } else {
        &SEEDREAM_4_5
    }
}

static GITEE_QWEN_IMAGE: ResolutionTable = ResolutionTable::new(&[
    ("1:1", &["1024x1024", "1328x1328", "1328x1328"]),
    ("4:3", &["1152x864", "1472x1104", "1472x1104"]),
    ("3:4", &["864x1152", "1104x1472", "1104x1472"]),
    ("16:9", &["1280x720", "1664x928", "1664x928"]),
    ("9:16", &["720x1280", "928x1664", "928x1664"]),
]);

static GITEE_Z_IMAGE_TURBO: ResolutionTable = ResolutionTable::new(&[
    ("1:1", &["1024x1024", "1280x1280", "1536x1536"]),
    ("2:3", &["832x1248", "1024x1536", "1248x1872"]),
    ("3:2", &["1248x832", "1536x1024", "1872x1248"]),
    ("3:4", &["864x1152", "1104x1472", "1296x1728"]),
    ("4:3", &["1152x864", "1472x1104", "1728x1296"]),
    ("7:9", &["896x1152", "1120x1440", "1344x1728"]),
    ("9:7", &["1152x896", "1440x1120", "1728x1344"]),
    ("9:16", &["720x1280", "864x1536", "1152x2048"]),
    ("16:9", &["1280x720", "1536x864", "2048x1152"]),
    ("9:21", &["576x1344", "720x1680", "864x2016"]),
    ("21:9", &["1344x576", "1680x720", "2016x864"]),
]);

static GITEE_FLUX: ResolutionTable = ResolutionTable::new(&[
    ("1:1", &["768x768", "1024x1024", "1440x1440"]),
    ("4:3", &["896x672", "1152x864", "1440x1080"]),
    ("3:4", &["672x896", "864x1152", "1080x1440"]),
    ("3:2", &["768x512", "1216x832", "1536x1024"]),
    ("2:3", &["512x768", "832x1216", "1024x1536"]),
    ("16:9", &["1024x576", "1344x768", "1920x1088"]),
    ("9:16", &["576x1024", "768x1344", "1088x1920"]),
]);

static GITEE_GENERIC: ResolutionTable = ResolutionTable::new(&[
    ("1:1", &["768x768", "1024x1024", "2048x2048"]),
    ("4:3", &["896x672", "1152x864", "2048x1536"]),
    ("3:4", &["672x896", "864x1152", "1536x2048"]),
    ("3:2", &["768x512", "1536x1024", "2048x1360"]),
    ("2:3", &["512x768", "1024x1536", "1360x2048"]),
    ("16:9", &["1024x576", "1280x720", "2048x1152"]),
    ("9:16", &["576x1024", "720x1280", "1152x2048"]),
]);

static ALIYUN_QWEN_IMAGE: ResolutionTable = ResolutionTable::new(&[
    ("1:1", &["1024*1024", "1328*1328", "1328*1328"]),
    ("4:3", &["1152*864", "1472*1104", "1472*1104"]),
    ("3:4", &["864*1152", "1104*1472", "1104*1472"]),
    ("16:9", &["1280*720", "1664*928", "1664*928"]),
    ("9:16", &["720*1280", "928*1664", "928*1664"]),
]);

static ALIYUN_Z_IMAGE_TURBO: ResolutionTable = ResolutionTable::new(&[
    ("1:1", &["1024*1024", "1280*1280", "1536*1536"]),
    ("2:3", &["832*1248", "1024*1536", "1248*1872"]),
    ("3:2", &["1248*832", "1536*1024", "1872*1248"]),
    ("3:4", &["864*1152", "1104*1472", "1296*1728"]),
    ("4:3", &["1152*864", "1472*1104", "1728*1296"]),
    ("7:9", &["896*1152", "1120*1440", "1344*1728"]),
    ("9:7", &["1152*896", "1440*1120", "1728*1344"]),
    ("9:16", &["720*1280", "864*1536", "1152*2048"]),
    ("16:9", &["1280*720", "1536*864", "2048*1152"]),
    ("9:21", &["576*1344", "720*1680", "864*2016"]),
    ("21:9", &["1344*576", "1680*720", "2016*864"]),
]);

static ALIYUN_WAN: ResolutionTable = ResolutionTable::new(&[
    ("1:1", &["1024*1024", "1280*1280", "1440*1440"]),
    ("3:4", &["960*1280", "1104*1472", "1104*1472"]),
    ("4:3", &["1280*960", "1472*1104", "1472*1104"]),
    ("9:16", &["768*1360", "960*1696", "960*1696"]),
    ("16:9", &["1360*768", "1696*960", "1696*960"]),
]);

static ALIYUN_GENERIC: ResolutionTable = ResolutionTable::new(&[
    ("1:1", &["768*768", "1024*1024", "1328*1328"]),
    ("4:3", &["896*672", "1152*864", "1472*1104"]),
    ("3:4", &["672*896", "864*1152", "1104*1472"]),
    ("3:2", &["768*512", "1536*1024", "2304*1536"]),
    ("2:3", &["512*768", "1024*1536", "1536*2304"]),
    ("16:9", &["1280*720", "1920*1080", "2560*1440"]),
    ("9:16", &["720*1280", "1080*1920", "1440*2560"]),
]);

static SEEDREAM_4_5: ResolutionTable = ResolutionTable::new(&[
    ("1:1", &["1600x1600", "2048x2048", "2560x2560"]),
    ("4:3", &["1792x1344", "2304x1728", "2816x2112"]),
    ("3:4", &["1344x1792", "1728x2304", "2112x2816"]),
    ("3:2", &["1920x1280", "2496x1664", "3072x2048"]),
    ("2:3", &["1280x1920", "1664x2496", "2048x3072"]),
    ("16:9", &["2048x1152", "2560x1440", "3200x1800"]),
    ("9:16", &["1152x2048", "1440x2560", "1800x3200"]),
]);

static SEEDREAM_4_0: ResolutionTable = ResolutionTable::new(&[
    ("1:1", &["1280x1280", "2048x2048", "2560x2560"]),
    ("4:3", &["1440x1080", "2304x1728", "2816x2112"]),
    ("3:4", &["1080x1440", "1728x2304", "2112x2816"]),
    ("3:2", &["1536x1024", "2496x1664", "3072x2048"]),
    ("2:3", &["1024x1536", "1664x2496", "2048x3072"]),
    ("16:9", &["1920x1080", "2560x1440", "3200x1800"]),
    ("9:16", &["1080x1920", "1440x2560", "1800x3200"]),
]);

static SEEDREAM_3_0: ResolutionTable = ResolutionTable::new(&[
    ("1:1", &["512x512", "1024x1024", "2048x2048"]),
    ("4:3", &["640x480", "1280x960", "2048x1536"]),
    ("3:4", &["480x640", "960x1280", "1536x2048"]),
    ("3:2", &["768x512", "1536x1024", "2048x1360"]),
    ("2:3", &["512x768", "1024x1536", "1360x2048"]),
    ("16:9", &["640x360", "1280x720", "1920x1080"]),
    ("9:16", &["360x640", "720x1280", "1080x1920"]),
]);
