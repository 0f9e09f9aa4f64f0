/// Sector names whose earnings swing with the business cycle.
///
/// Tokyo Stock Exchange sector names followed by their English equivalents.
pub const CYCLICAL_SECTORS: [&str; 32] = [
    "海運業",
    "鉄鋼",
    "非鉄金属",
    "石油・石炭製品",
    "化学",
    "機械",
    "電気機器",
    "輸送用機器",
    "建設業",
    "金属製品",
    "ゴム製品",
    "ガラス・土石製品",
    "鉱業",
    "陸運業",
    "空運業",
    "パルプ・紙",
    "marine transportation",
    "iron & steel",
    "nonferrous metals",
    "oil & coal products",
    "chemicals",
    "machinery",
    "electric appliances",
    "transportation equipment",
    "construction",
    "metal products",
    "rubber products",
    "glass & ceramics products",
    "mining",
    "land transportation",
    "air transportation",
    "pulp & paper",
];

/// Substring match against [`CYCLICAL_SECTORS`], ignoring ASCII case.
pub fn is_cyclical(industry: &str) -> bool {
    let normalized = industry.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return false;
    }
    CYCLICAL_SECTORS.iter().any(|sector| normalized.contains(sector))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_japanese_sector_names() {
        assert!(is_cyclical("海運業"));
        assert!(is_cyclical("鉄鋼"));
        assert!(is_cyclical("石油・石炭製品"));
        assert!(!is_cyclical("情報・通信業"));
        assert!(!is_cyclical("医薬品"));
    }

    #[test]
    fn test_english_names_ignore_case() {
        assert!(is_cyclical("Marine Transportation"));
        assert!(is_cyclical("Specialty Chemicals"));
        assert!(is_cyclical("IRON & STEEL"));
        assert!(!is_cyclical("Software"));
    }

    #[test]
    fn test_blank_is_not_cyclical() {
        assert!(!is_cyclical(""));
        assert!(!is_cyclical("   "));
    }
}
