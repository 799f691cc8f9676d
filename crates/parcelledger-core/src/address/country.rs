//! ISO 3166 alpha-3 to alpha-2 conversion.
//!
//! Covers France with its overseas territories, Europe and the main
//! international destinations served by postal carriers.

const COUNTRIES: &[(&str, &str)] = &[
    ("AND", "AD"),
    ("ARE", "AE"),
    ("ARG", "AR"),
    ("AUS", "AU"),
    ("AUT", "AT"),
    ("BEL", "BE"),
    ("BGR", "BG"),
    ("BLM", "BL"),
    ("BRA", "BR"),
    ("CAN", "CA"),
    ("CHE", "CH"),
    ("CHN", "CN"),
    ("CIV", "CI"),
    ("CMR", "CM"),
    ("CYP", "CY"),
    ("CZE", "CZ"),
    ("DEU", "DE"),
    ("DNK", "DK"),
    ("DZA", "DZ"),
    ("ESP", "ES"),
    ("EST", "EE"),
    ("FIN", "FI"),
    ("FRA", "FR"),
    ("GBR", "GB"),
    ("GLP", "GP"),
    ("GRC", "GR"),
    ("GUF", "GF"),
    ("HKG", "HK"),
    ("HRV", "HR"),
    ("HUN", "HU"),
    ("IND", "IN"),
    ("IRL", "IE"),
    ("ISL", "IS"),
    ("ISR", "IL"),
    ("ITA", "IT"),
    ("JPN", "JP"),
    ("KOR", "KR"),
    ("LIE", "LI"),
    ("LTU", "LT"),
    ("LUX", "LU"),
    ("LVA", "LV"),
    ("MAF", "MF"),
    ("MAR", "MA"),
    ("MCO", "MC"),
    ("MDG", "MG"),
    ("MEX", "MX"),
    ("MLT", "MT"),
    ("MTQ", "MQ"),
    ("MUS", "MU"),
    ("MYT", "YT"),
    ("NCL", "NC"),
    ("NLD", "NL"),
    ("NOR", "NO"),
    ("NZL", "NZ"),
    ("POL", "PL"),
    ("PRT", "PT"),
    ("PYF", "PF"),
    ("REU", "RE"),
    ("ROU", "RO"),
    ("RUS", "RU"),
    ("SEN", "SN"),
    ("SGP", "SG"),
    ("SPM", "PM"),
    ("SVK", "SK"),
    ("SVN", "SI"),
    ("SWE", "SE"),
    ("TUN", "TN"),
    ("TUR", "TR"),
    ("UKR", "UA"),
    ("USA", "US"),
    ("WLF", "WF"),
    ("ZAF", "ZA"),
];

/// Returns the alpha-2 code for an alpha-3 or alpha-2 country code.
///
/// Matching ignores case and surrounding whitespace.
#[must_use]
pub fn alpha_2(code: &str) -> Option<&'static str> {
    let code = code.trim().to_ascii_uppercase();
    match code.len() {
        3 => COUNTRIES
            .iter()
            .find(|(alpha_3, _)| *alpha_3 == code)
            .map(|(_, alpha_2)| *alpha_2),
        2 => COUNTRIES
            .iter()
            .find(|(_, alpha_2)| *alpha_2 == code)
            .map(|(_, alpha_2)| *alpha_2),
        _ => None,
    }
}
