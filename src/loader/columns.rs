//! Header resolution shared by the CSV and workbook readers.

use crate::normalize::normalize_name;

/// A required column and the header spellings accepted for it.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

pub const TIME: Column = Column {
    name: "time",
    aliases: &["time", "timestamp", "datetime", "측정시간", "시간"],
};
pub const TEMPERATURE: Column = Column {
    name: "temperature",
    aliases: &["temperature", "temp", "온도"],
};
pub const HUMIDITY: Column = Column {
    name: "humidity",
    aliases: &["humidity", "습도"],
};
pub const PH: Column = Column {
    name: "ph",
    aliases: &["ph"],
};
pub const EC: Column = Column {
    name: "ec",
    aliases: &["ec", "전기전도도"],
};

pub const BIOMASS: Column = Column {
    name: "생중량(g)",
    aliases: &["생중량(g)", "biomass", "biomass_g", "fresh_weight"],
};
pub const LEAF_COUNT: Column = Column {
    name: "잎 수(장)",
    aliases: &["잎 수(장)", "leaf_count", "leaves"],
};
pub const SHOOT_LENGTH: Column = Column {
    name: "지상부 길이(mm)",
    aliases: &["지상부 길이(mm)", "shoot_length", "shoot_length_mm"],
};

/// Canonical form of a header cell: BOM stripped, trimmed, NFC, lowercase.
pub fn header_key(raw: &str) -> String {
    normalize_name(raw.trim_start_matches('\u{feff}').trim()).to_lowercase()
}

/// Resolve each of `columns` to its index in `headers`.
///
/// Returns the name of the first column with no matching header.
pub fn resolve<'h, I, const N: usize>(
    headers: I,
    columns: [Column; N],
) -> Result<[usize; N], &'static str>
where
    I: IntoIterator<Item = &'h str>,
{
    // ---
    let keys: Vec<String> = headers.into_iter().map(header_key).collect();

    let mut out = [0usize; N];
    for (slot, column) in out.iter_mut().zip(columns.iter()) {
        *slot = keys
            .iter()
            .position(|k| column.aliases.iter().any(|a| header_key(a) == *k))
            .ok_or(column.name)?;
    }
    Ok(out)
}
