//! The built-in target list.

use super::countries::COUNTRIES;
use super::{Provider, SeriesSpec};
use crate::series::{Category, PanelAxis, SeriesKey, SeriesShape};
use crate::synthetic::{CuratedTable, PanelDynamics, SyntheticModel};

/// (label, series id, center, vol)
const FRED_SERIES: &[(&str, &str, f64, f64)] = &[
    ("fed_funds", "DFF", 5.33, 0.05),
    ("us_10y", "DGS10", 4.2, 0.08),
    ("us_2y", "DGS2", 4.5, 0.1),
    ("us_2s10s", "T10Y2Y", -0.3, 0.08),
    ("real_yield_10y", "DFII10", 1.8, 0.1),
    ("breakeven_10y", "T10YIE", 2.3, 0.05),
    ("fed_balance_sheet", "WALCL", 7_800_000.0, 50_000.0),
    ("rrp", "RRPONTSYD", 500_000.0, 30_000.0),
    ("tga", "WTREGEN", 750_000.0, 40_000.0),
    ("m2", "WM2NS", 20_800.0, 100.0),
    ("hy_oas", "BAMLH0A0HYM2", 3.8, 0.3),
    ("ig_oas", "BAMLC0A0CM", 1.2, 0.1),
    ("nfci", "NFCI", -0.3, 0.1),
    ("initial_claims", "ICSA", 220_000.0, 8_000.0),
    ("continuing_claims", "CCSA", 1_850_000.0, 30_000.0),
    ("consumer_sentiment", "UMCSENT", 68.0, 3.0),
    ("cpi", "CPIAUCSL", 310.0, 0.5),
    ("unemployment", "UNRATE", 3.8, 0.1),
    ("personal_savings", "PSAVERT", 4.5, 0.5),
    ("industrial_production", "INDPRO", 103.0, 0.3),
    ("lei", "USALOLITONOSTSAM", 99.5, 0.2),
];

/// (indicator, label, per-country base in `COUNTRIES` order)
const WB_INDICATORS: &[(&str, &str, Option<[f64; 13]>)] = &[
    (
        "BN.CAB.XOKA.GD.ZS",
        "Current account balance (% of GDP)",
        Some([-3.0, 2.5, -3.5, 3.5, 1.5, -1.0, -2.0, 8.0, 4.0, -1.5, -2.5, -1.0, 7.0]),
    ),
    (
        "NE.RSB.GNFS.CD",
        "External balance on goods and services (US$)",
        Some([
            -8e11, 3e11, -2e11, 1.5e11, 5e11, -5e10, -3e10, 5e10, 6e10, -1.5e11, -3e10, -1e10,
            2.5e11,
        ]),
    ),
    (
        "BX.KLT.DINV.CD.WD",
        "FDI net inflows (US$)",
        Some([
            3.5e11, 2e11, 1.5e11, 3e10, 1.8e11, 5e10, 6e10, 4e10, 1.5e10, 5e10, 7e10, 3.5e10, 4e10,
        ]),
    ),
    (
        "BM.KLT.DINV.CD.WD",
        "FDI net outflows (US$)",
        Some([
            4e11, 2.5e11, 1.2e11, 1.5e11, 1.2e11, 8e10, 3e10, 1e11, 5e10, 2e10, 1.5e10, 1e10, 1e11,
        ]),
    ),
    (
        "FI.RES.TOTL.CD",
        "Total reserves incl. gold (US$)",
        Some([
            2.4e11, 3e11, 1.8e11, 1.3e12, 3.2e12, 1e11, 6e10, 9e11, 4.2e11, 6e11, 3.5e11, 2e11,
            2.5e11,
        ]),
    ),
    ("DT.DOD.DECT.CD", "External debt stocks (US$)", None),
    (
        "GC.DOD.TOTL.GD.ZS",
        "Central government debt (% of GDP)",
        Some([120.0, 90.0, 100.0, 260.0, 75.0, 105.0, 55.0, 40.0, 50.0, 85.0, 90.0, 55.0, 65.0]),
    ),
    (
        "GC.BAL.CASH.GD.ZS",
        "Cash surplus/deficit (% of GDP)",
        Some([-6.0, -3.0, -5.0, -8.0, -5.0, -2.0, -1.0, 1.0, 0.5, -7.0, -5.0, -3.5, 0.5]),
    ),
    (
        "NY.GDP.MKTP.CD",
        "GDP (current US$)",
        Some([
            2.5e13, 1.4e13, 3.1e12, 4.2e12, 1.8e13, 2e12, 1.7e12, 8e11, 1.7e12, 3.5e12, 2e12,
            1.3e12, 4.1e12,
        ]),
    ),
    (
        "NY.GDP.MKTP.KD.ZG",
        "GDP growth (annual %)",
        Some([2.5, 1.5, 1.3, 1.0, 5.5, 2.0, 2.5, 1.5, 2.5, 6.5, 1.5, 2.0, 1.0]),
    ),
    (
        "FP.CPI.TOTL.ZG",
        "Inflation, consumer prices (annual %)",
        Some([3.5, 2.8, 4.0, 3.0, 0.5, 3.2, 4.5, 1.5, 3.5, 5.5, 5.0, 5.5, 3.0]),
    ),
    (
        "SL.UEM.TOTL.ZS",
        "Unemployment (% of labor force)",
        Some([3.8, 6.5, 4.0, 2.6, 5.2, 5.5, 3.8, 2.0, 3.0, 7.5, 8.0, 3.5, 3.2]),
    ),
];

/// Benchmark index starting levels in `COUNTRIES` order.
const INDEX_STARTS: [f64; 13] = [
    4200.0, 4100.0, 7200.0, 32000.0, 3100.0, 19000.0, 7000.0, 11000.0, 2400.0, 60000.0, 115000.0,
    52000.0, 15000.0,
];

/// FX starting rates, keyed by pair.
const FX_STARTS: &[(&str, f64)] = &[
    ("EURUSD=X", 1.08),
    ("GBPUSD=X", 1.26),
    ("USDJPY=X", 148.0),
    ("USDCNY=X", 7.20),
    ("USDCAD=X", 1.36),
    ("AUDUSD=X", 0.66),
    ("USDCHF=X", 0.88),
    ("USDKRW=X", 1320.0),
    ("USDINR=X", 83.5),
    ("USDBRL=X", 4.95),
    ("USDMXN=X", 17.2),
];

/// (ticker, label, start, drift, vol)
const COMMODITIES: &[(&str, &str, f64, f64, f64)] = &[
    ("GC=F", "Gold", 1950.0, 0.0003, 0.008),
    ("HG=F", "Copper", 3.80, 0.0002, 0.015),
    ("CL=F", "WTI Crude", 75.0, 0.0001, 0.02),
    ("BZ=F", "Brent Crude", 80.0, 0.0001, 0.02),
];

const SEMI_STOCKS: &[(&str, &str, f64)] = &[
    ("^SOX", "PHLX Semiconductor Index", 3800.0),
    ("NVDA", "NVIDIA", 480.0),
    ("TSM", "TSMC", 105.0),
    ("ASML", "ASML", 680.0),
    ("AMD", "AMD", 120.0),
    ("INTC", "Intel", 35.0),
    ("AVGO", "Broadcom", 900.0),
    ("QCOM", "Qualcomm", 145.0),
    ("MU", "Micron", 80.0),
    ("LRCX", "Lam Research", 680.0),
    ("AMAT", "Applied Materials", 160.0),
];

const SEMI_ETFS: &[(&str, &str, f64)] = &[
    ("SMH", "VanEck Semiconductor ETF", 220.0),
    ("SOXX", "iShares Semiconductor ETF", 480.0),
];

/// IMF balance of payments (US$ bn) and gold reserves (tonnes), in `COUNTRIES` order.
const IMF_BOP_BASES: [f64; 13] = [
    -500.0, 300.0, -100.0, 150.0, 200.0, -30.0, -50.0, 70.0, 80.0, -40.0, -50.0, -20.0, 250.0,
];
const IMF_GOLD_BASES: [f64; 13] = [
    8133.0, 10770.0, 310.0, 846.0, 2235.0, 0.0, 80.0, 1040.0, 104.0, 800.0, 130.0, 120.0, 3355.0,
];

pub(super) fn all_specs() -> Vec<SeriesSpec> {
    let mut specs = Vec::with_capacity(84);
    specs.extend(fred_specs());
    specs.extend(world_bank_specs());
    specs.extend(market_specs());
    specs.extend(imf_specs());
    specs.extend(semi_specs());
    specs.extend(policy_specs());
    specs
}

fn spec(
    category: Category,
    name: &str,
    label: &str,
    remote_id: &str,
    shape: SeriesShape,
    provider: Provider,
    model: SyntheticModel,
) -> SeriesSpec {
    SeriesSpec {
        key: SeriesKey::new(category, name),
        label: label.to_string(),
        remote_id: remote_id.to_string(),
        shape,
        provider,
        model,
    }
}

fn fred_specs() -> Vec<SeriesSpec> {
    FRED_SERIES
        .iter()
        .map(|&(label, id, center, vol)| {
            let model = match id {
                "WALCL" => SyntheticModel::MeanReverting {
                    center,
                    vol,
                    trend: Some((0.0, -500_000.0)),
                    floor: None,
                    ceiling: None,
                },
                "RRPONTSYD" => SyntheticModel::MeanReverting {
                    center,
                    vol,
                    trend: Some((1_500_000.0, 0.0)),
                    floor: Some(0.0),
                    ceiling: None,
                },
                "CPIAUCSL" => SyntheticModel::MeanReverting {
                    center,
                    vol,
                    trend: Some((-10.0, 10.0)),
                    floor: None,
                    ceiling: None,
                },
                _ => SyntheticModel::mean_reverting(center, vol),
            };
            spec(
                Category::Fred,
                id,
                label,
                id,
                SeriesShape::TimeValue,
                Provider::Fred,
                model,
            )
        })
        .collect()
}

fn world_bank_specs() -> Vec<SeriesSpec> {
    WB_INDICATORS
        .iter()
        .map(|&(indicator, label, bases)| {
            let bases = COUNTRIES
                .iter()
                .enumerate()
                .map(|(i, c)| (c.wb_code.to_string(), bases.map_or(0.0, |b| b[i])))
                .collect();
            spec(
                Category::WorldBank,
                indicator,
                label,
                indicator,
                SeriesShape::Panel(PanelAxis::Annual),
                Provider::WorldBank,
                SyntheticModel::AnnualPanel {
                    first_year: 2000,
                    last_year: 2025,
                    bases,
                    dynamics: PanelDynamics::Walk,
                },
            )
        })
        .collect()
}

fn yahoo_ohlcv(
    category: Category,
    ticker: &str,
    label: &str,
    start: f64,
    drift: f64,
    vol: f64,
) -> SeriesSpec {
    spec(
        category,
        ticker,
        label,
        ticker,
        SeriesShape::Ohlcv,
        Provider::Yahoo,
        SyntheticModel::OhlcvWalk { start, drift, vol },
    )
}

fn yahoo_close(
    name: &str,
    label: &str,
    remote_id: &str,
    model: SyntheticModel,
) -> SeriesSpec {
    spec(
        Category::Market,
        name,
        label,
        remote_id,
        SeriesShape::TimeValue,
        Provider::Yahoo,
        model,
    )
}

fn market_specs() -> Vec<SeriesSpec> {
    let mut specs: Vec<SeriesSpec> = COUNTRIES
        .iter()
        .zip(INDEX_STARTS)
        .map(|(c, start)| yahoo_ohlcv(Category::Market, c.index, c.name, start, 0.0003, 0.012))
        .collect();

    specs.extend(FX_STARTS.iter().map(|&(pair, start)| {
        yahoo_close(
            pair,
            pair,
            pair,
            SyntheticModel::RandomWalk {
                start,
                drift: 0.0001,
                vol: 0.005,
            },
        )
    }));

    specs.push(yahoo_close(
        "DXY",
        "US Dollar Index",
        "DX-Y.NYB",
        SyntheticModel::RandomWalk {
            start: 104.0,
            drift: 0.0001,
            vol: 0.004,
        },
    ));

    specs.extend(
        COMMODITIES
            .iter()
            .map(|&(ticker, label, start, drift, vol)| {
                yahoo_ohlcv(Category::Market, ticker, label, start, drift, vol)
            }),
    );

    specs.push(yahoo_close(
        "^VIX",
        "CBOE Volatility Index",
        "^VIX",
        SyntheticModel::MeanReverting {
            center: 18.0,
            vol: 1.5,
            trend: None,
            floor: Some(9.0),
            ceiling: Some(80.0),
        },
    ));
    specs.push(yahoo_close(
        "^MOVE",
        "ICE BofA MOVE Index",
        "^MOVE",
        SyntheticModel::MeanReverting {
            center: 110.0,
            vol: 5.0,
            trend: None,
            floor: Some(50.0),
            ceiling: Some(200.0),
        },
    ));
    specs
}

fn imf_specs() -> Vec<SeriesSpec> {
    let panel = |name: &str, label: &str, bases: &[f64; 13], dynamics| {
        spec(
            Category::Imf,
            name,
            label,
            name,
            SeriesShape::Panel(PanelAxis::Annual),
            Provider::Curated,
            SyntheticModel::AnnualPanel {
                first_year: 2005,
                last_year: 2025,
                bases: COUNTRIES
                    .iter()
                    .zip(bases)
                    .map(|(c, b)| (c.imf_code.to_string(), *b))
                    .collect(),
                dynamics,
            },
        )
    };
    vec![
        panel(
            "bop",
            "Balance of payments, current account (US$ bn)",
            &IMF_BOP_BASES,
            PanelDynamics::MeanReverting,
        ),
        panel(
            "gold_reserves",
            "Official gold reserves (tonnes)",
            &IMF_GOLD_BASES,
            PanelDynamics::Accumulating,
        ),
    ]
}

fn semi_specs() -> Vec<SeriesSpec> {
    let mut specs: Vec<SeriesSpec> = SEMI_STOCKS
        .iter()
        .map(|&(ticker, label, start)| {
            yahoo_ohlcv(Category::Semi, ticker, label, start, 0.0005, 0.02)
        })
        .collect();
    specs.extend(SEMI_ETFS.iter().map(|&(ticker, label, start)| {
        yahoo_ohlcv(Category::Semi, ticker, label, start, 0.0005, 0.018)
    }));
    for (name, label, model) in [
        ("revenue_cycle", "Global semiconductor revenue cycle", SyntheticModel::SemiRevenueCycle),
        ("inventory_cycle", "Semiconductor inventory cycle", SyntheticModel::SemiInventoryCycle),
    ] {
        specs.push(spec(
            Category::Semi,
            name,
            label,
            name,
            SeriesShape::Panel(PanelAxis::Daily),
            Provider::Curated,
            model,
        ));
    }
    specs
}

fn policy_specs() -> Vec<SeriesSpec> {
    [
        ("events", "Policy event log", CuratedTable::PolicyEvents),
        ("cb_calendar", "Central bank calendar", CuratedTable::CentralBankCalendar),
        ("tariff_tracker", "Tariff tracker", CuratedTable::TariffTracker),
    ]
    .into_iter()
    .map(|(name, label, table)| {
        spec(
            Category::Policy,
            name,
            label,
            name,
            SeriesShape::EventLog,
            Provider::Curated,
            SyntheticModel::Curated(table),
        )
    })
    .collect()
}
