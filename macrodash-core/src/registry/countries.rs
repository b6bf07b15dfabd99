//! Tracked economies and their identifiers at each provider.

/// One tracked economy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    pub code: &'static str,
    pub name: &'static str,
    /// World Bank ISO3 / aggregate code.
    pub wb_code: &'static str,
    /// IMF reporting code.
    pub imf_code: &'static str,
    /// Benchmark equity index ticker.
    pub index: &'static str,
    /// FX pair against USD, if any.
    pub currency_pair: Option<&'static str>,
}

const fn country(
    code: &'static str,
    name: &'static str,
    wb_code: &'static str,
    imf_code: &'static str,
    index: &'static str,
    currency_pair: Option<&'static str>,
) -> Country {
    Country {
        code,
        name,
        wb_code,
        imf_code,
        index,
        currency_pair,
    }
}

pub const COUNTRIES: [Country; 13] = [
    country("US", "United States", "USA", "US", "^GSPC", None),
    country("EU", "Eurozone", "EMU", "U2", "^STOXX50E", Some("EURUSD=X")),
    country("UK", "United Kingdom", "GBR", "GB", "^FTSE", Some("GBPUSD=X")),
    country("JP", "Japan", "JPN", "JP", "^N225", Some("USDJPY=X")),
    country("CN", "China", "CHN", "CN", "000001.SS", Some("USDCNY=X")),
    country("CA", "Canada", "CAN", "CA", "^GSPTSE", Some("USDCAD=X")),
    country("AU", "Australia", "AUS", "AU", "^AXJO", Some("AUDUSD=X")),
    country("CH", "Switzerland", "CHE", "CH", "^SSMI", Some("USDCHF=X")),
    country("KR", "South Korea", "KOR", "KR", "^KS11", Some("USDKRW=X")),
    country("IN", "India", "IND", "IN", "^BSESN", Some("USDINR=X")),
    country("BR", "Brazil", "BRA", "BR", "^BVSP", Some("USDBRL=X")),
    country("MX", "Mexico", "MEX", "MX", "^MXX", Some("USDMXN=X")),
    country("DE", "Germany", "DEU", "DE", "^GDAXI", None),
];

/// Look up a country by its World Bank code.
pub fn by_wb_code(wb_code: &str) -> Option<&'static Country> {
    COUNTRIES.iter().find(|c| c.wb_code == wb_code)
}
