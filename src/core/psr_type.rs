//! Production (PSR) types of the ENTSO-E code list.

/// Human-readable label of the production type code, if the code is known.
#[must_use]
pub fn label(code: &str) -> Option<&'static str> {
    let label = match code {
        "A03" => "Mixed",
        "A04" => "Generation",
        "A05" => "Load",
        "B01" => "Biomass",
        "B02" => "Fossil Brown coal/Lignite",
        "B03" => "Fossil Coal-derived gas",
        "B04" => "Fossil Gas",
        "B05" => "Fossil Hard coal",
        "B06" => "Fossil Oil",
        "B07" => "Fossil Oil shale",
        "B08" => "Fossil Peat",
        "B09" => "Geothermal",
        "B10" => "Hydro Pumped Storage",
        "B11" => "Hydro Run-of-river and poundage",
        "B12" => "Hydro Water Reservoir",
        "B13" => "Marine",
        "B14" => "Nuclear",
        "B15" => "Other renewable",
        "B16" => "Solar",
        "B17" => "Waste",
        "B18" => "Wind Offshore",
        "B19" => "Wind Onshore",
        "B20" => "Other",
        "B21" => "AC Link",
        "B22" => "DC Link",
        "B23" => "Substation",
        "B24" => "Transformer",
        "B25" => "Energy storage",
        _ => return None,
    };
    Some(label)
}

/// Label of the production type, falling back to the raw code.
#[must_use]
pub fn label_or_code(code: &str) -> String {
    label(code).map_or_else(|| code.to_string(), str::to_string)
}

/// Parse a `--psr-type` argument: the code must be a known one.
pub fn parse_code(code: &str) -> Result<String, String> {
    let code = code.trim().to_ascii_uppercase();
    match label(&code) {
        Some(_) => Ok(code),
        None => Err(format!("unknown production type code `{code}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_code() {
        assert_eq!(label_or_code("B14"), "Nuclear");
    }

    #[test]
    fn test_unknown_code_is_kept() {
        assert_eq!(label_or_code("B99"), "B99");
    }

    #[test]
    fn test_parse_code() {
        assert_eq!(parse_code(" b04 ").as_deref(), Ok("B04"));
        assert!(parse_code("Z01").is_err());
    }
}
