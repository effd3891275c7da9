/// Trim a free-text location and collapse internal whitespace runs to one space
///
/// No semantic validation is applied.
pub fn clean_location_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_location_unchanged() {
        assert_eq!(clean_location_text("北京市朝阳区"), "北京市朝阳区");
    }

    #[test]
    fn test_collapses_and_trims() {
        assert_eq!(clean_location_text("北京市  朝阳区  "), "北京市 朝阳区");
        assert_eq!(clean_location_text("  西城区德胜门监测站  "), "西城区德胜门监测站");
        assert_eq!(clean_location_text("上海市\t浦东新区\n张江站"), "上海市 浦东新区 张江站");
    }

    #[test]
    fn test_keeps_single_internal_space() {
        assert_eq!(clean_location_text("北京市 朝阳区"), "北京市 朝阳区");
    }

    #[test]
    fn test_blank_becomes_empty() {
        assert_eq!(clean_location_text("   "), "");
        assert_eq!(clean_location_text(""), "");
    }
}
