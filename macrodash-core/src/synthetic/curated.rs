//! Curated policy tables: event log, central bank calendar, tariff tracker.

use crate::table::{EventColumn, EventLogTable, SeriesTable};
use chrono::NaiveDate;

/// Which curated table a series serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CuratedTable {
    PolicyEvents,
    CentralBankCalendar,
    TariffTracker,
}

impl CuratedTable {
    pub fn build(&self) -> SeriesTable {
        SeriesTable::EventLog(match self {
            CuratedTable::PolicyEvents => policy_events(),
            CuratedTable::CentralBankCalendar => central_bank_calendar(),
            CuratedTable::TariffTracker => tariff_tracker(),
        })
    }
}

fn dates(raw: &[&str]) -> Vec<NaiveDate> {
    raw.iter()
        .filter_map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .collect()
}

struct PolicyEvent {
    date: &'static str,
    category: &'static str,
    country: &'static str,
    event: &'static str,
    impact: &'static str,
    sectors: &'static str,
    detail: &'static str,
}

const POLICY_EVENTS: &[PolicyEvent] = &[
    PolicyEvent {
        date: "2025-01-15",
        category: "Trade & Tariffs",
        country: "US",
        event: "US raises Section 301 tariffs on Chinese EVs to 100%, semiconductors to 50%",
        impact: "Negative",
        sectors: "Autos, Semiconductors",
        detail: "Effective Q2 2025. Targets $18B in imports. China signals retaliation on US agricultural exports.",
    },
    PolicyEvent {
        date: "2025-02-01",
        category: "Central Bank Policy",
        country: "US",
        event: "FOMC holds rates at 5.25-5.50%, signals patience on cuts",
        impact: "Neutral",
        sectors: "Broad Market",
        detail: "Dot plot shows 2 cuts in 2025 vs market pricing of 4-5. USD strengthens on hawkish hold.",
    },
    PolicyEvent {
        date: "2025-02-20",
        category: "Export Controls & Sanctions",
        country: "US",
        event: "Commerce Dept expands AI chip export controls to include ASML DUV tools",
        impact: "Negative",
        sectors: "Semiconductors, AI",
        detail: "New rule requires licenses for DUV lithography exports to China. ASML, LRCX, AMAT affected.",
    },
    PolicyEvent {
        date: "2025-03-10",
        category: "Industrial Policy & Subsidies",
        country: "CN",
        event: "China announces $47B 'Big Fund III' for domestic semiconductor capacity",
        impact: "Mixed",
        sectors: "Semiconductors",
        detail: "Third phase of national IC fund. Focus on mature-node fabs and packaging.",
    },
    PolicyEvent {
        date: "2025-03-15",
        category: "Central Bank Policy",
        country: "JP",
        event: "BOJ raises policy rate to 0.50%, signals further normalization",
        impact: "Mixed",
        sectors: "FX, Bonds",
        detail: "Yen strengthens 3% on surprise hawkish shift. Carry trade unwind risk rises.",
    },
    PolicyEvent {
        date: "2025-04-01",
        category: "Trade & Tariffs",
        country: "US",
        event: "US imposes 25% tariffs on steel/aluminum from all countries",
        impact: "Negative",
        sectors: "Industrials, Construction",
        detail: "Universal tariff replaces country-specific exemptions. EU, Japan, Canada announce retaliation.",
    },
    PolicyEvent {
        date: "2025-04-20",
        category: "Industrial Policy & Subsidies",
        country: "US",
        event: "CHIPS Act Phase 2: $8B disbursed to Intel, Samsung US fabs",
        impact: "Positive",
        sectors: "Semiconductors",
        detail: "Intel Arizona fab gets $5B, Samsung Taylor TX gets $3B. Production expected 2027.",
    },
    PolicyEvent {
        date: "2025-05-10",
        category: "Capital Controls",
        country: "CN",
        event: "PBOC tightens offshore yuan lending to defend CNY",
        impact: "Mixed",
        sectors: "FX, EM",
        detail: "Squeeze on CNH short positions. Signal of capital outflow pressure.",
    },
    PolicyEvent {
        date: "2025-06-15",
        category: "Central Bank Policy",
        country: "EU",
        event: "ECB cuts deposit rate by 25bp to 4.25%, signals data-dependent path",
        impact: "Positive",
        sectors: "EU Equities, Bonds",
        detail: "First cut of the cycle. EUR weakens modestly. EU bank stocks rally.",
    },
    PolicyEvent {
        date: "2025-07-01",
        category: "Regulatory Change",
        country: "EU",
        event: "EU Carbon Border Adjustment Mechanism (CBAM) full implementation",
        impact: "Mixed",
        sectors: "Industrials, Energy, Materials",
        detail: "Carbon tariffs on steel, cement, aluminum, fertilizers, electricity imports.",
    },
    PolicyEvent {
        date: "2025-08-05",
        category: "Geopolitical Event",
        country: "CN",
        event: "China conducts large-scale military exercises near Taiwan Strait",
        impact: "Negative",
        sectors: "Semiconductors, Defense, Shipping",
        detail: "Week-long exercises. TSM stock drops 8%. Shipping insurance rates triple.",
    },
    PolicyEvent {
        date: "2025-09-01",
        category: "Trade & Tariffs",
        country: "CN",
        event: "China restricts export of gallium, germanium, and antimony",
        impact: "Negative",
        sectors: "Semiconductors, Defense",
        detail: "Critical minerals export permits required. Affects chip substrates.",
    },
    PolicyEvent {
        date: "2025-09-20",
        category: "Central Bank Policy",
        country: "US",
        event: "Fed cuts rates by 25bp to 5.00-5.25%, first cut of the cycle",
        impact: "Positive",
        sectors: "Broad Market",
        detail: "Markets rally. Forward guidance suggests gradual easing. DXY drops 1.5%.",
    },
    PolicyEvent {
        date: "2025-10-15",
        category: "Industrial Policy & Subsidies",
        country: "US",
        event: "IRA: $4.5B in new clean energy tax credit allocations",
        impact: "Positive",
        sectors: "Clean Energy, EVs, Utilities",
        detail: "Focus on battery manufacturing, solar panels, EV charging infrastructure.",
    },
    PolicyEvent {
        date: "2025-11-01",
        category: "Export Controls & Sanctions",
        country: "US",
        event: "US Treasury designates 15 Chinese entities under Russia-related sanctions",
        impact: "Negative",
        sectors: "Banks, Trade Finance",
        detail: "Targets Chinese banks facilitating Russian commodity trade.",
    },
    PolicyEvent {
        date: "2025-12-10",
        category: "Central Bank Policy",
        country: "US",
        event: "Fed cuts rates by 25bp to 4.75-5.00%, signals 3 more cuts in 2026",
        impact: "Positive",
        sectors: "Broad Market, Real Estate",
        detail: "Dovish dot plot. 10Y yield drops to 3.9%. REIT sector surges 5%.",
    },
    PolicyEvent {
        date: "2026-01-05",
        category: "Trade & Tariffs",
        country: "US",
        event: "New administration announces 60% tariff proposal on all Chinese goods",
        impact: "Negative",
        sectors: "Consumer, Tech, Industrials",
        detail: "Phase-in over 2026. Markets sell off 3%. Supply chain diversification accelerates.",
    },
    PolicyEvent {
        date: "2026-01-20",
        category: "Geopolitical Event",
        country: "US",
        event: "US executive orders on energy, trade, and immigration on day one",
        impact: "Mixed",
        sectors: "Energy, Industrials, Agriculture",
        detail: "Paris Agreement withdrawal, Keystone XL restart, border emergency.",
    },
    PolicyEvent {
        date: "2026-02-01",
        category: "Central Bank Policy",
        country: "US",
        event: "FOMC pauses rate cuts at 4.75-5.00%, cites tariff inflation risks",
        impact: "Negative",
        sectors: "Broad Market",
        detail: "Hawkish pause. Market reprices terminal rate higher. 2Y yield jumps 15bp.",
    },
    PolicyEvent {
        date: "2026-02-05",
        category: "Export Controls & Sanctions",
        country: "US",
        event: "Commerce Dept proposes 'know your customer' rule for cloud AI compute",
        impact: "Mixed",
        sectors: "Cloud, AI, Semiconductors",
        detail: "Would require cloud providers to verify end-users of AI training workloads.",
    },
];

fn policy_events() -> EventLogTable {
    let pick = |f: fn(&PolicyEvent) -> &'static str| -> Vec<&'static str> {
        POLICY_EVENTS.iter().map(f).collect()
    };
    EventLogTable {
        columns: vec![
            EventColumn::date("date", dates(&pick(|e| e.date))),
            EventColumn::text("category", &pick(|e| e.category)),
            EventColumn::text("country", &pick(|e| e.country)),
            EventColumn::text("event", &pick(|e| e.event)),
            EventColumn::text("impact", &pick(|e| e.impact)),
            EventColumn::text("sectors", &pick(|e| e.sectors)),
            EventColumn::text("detail", &pick(|e| e.detail)),
        ],
    }
}

fn central_bank_calendar() -> EventLogTable {
    EventLogTable {
        columns: vec![
            EventColumn::date(
                "date",
                dates(&[
                    "2026-02-05", "2026-03-06", "2026-03-14", "2026-03-19", "2026-03-20",
                    "2026-04-17", "2026-05-07", "2026-05-08", "2026-06-05", "2026-06-18",
                ]),
            ),
            EventColumn::text(
                "bank",
                &["RBA", "ECB", "BOJ", "FOMC", "BOE", "ECB", "FOMC", "BOE", "ECB", "FOMC"],
            ),
            EventColumn::text(
                "country",
                &["AU", "EU", "JP", "US", "UK", "EU", "US", "UK", "EU", "US"],
            ),
            EventColumn::number(
                "current_rate",
                &[4.35, 4.00, 0.50, 4.875, 5.00, 4.00, 4.875, 5.00, 3.75, 4.625],
            ),
            EventColumn::text(
                "expected_action",
                &[
                    "Hold", "Cut 25bp", "Hold", "Hold", "Hold", "Cut 25bp", "Cut 25bp",
                    "Cut 25bp", "Hold", "Cut 25bp",
                ],
            ),
            EventColumn::text(
                "market_probability",
                &[
                    "85% hold", "70% cut", "90% hold", "80% hold", "75% hold", "60% cut",
                    "55% cut", "65% cut", "70% hold", "60% cut",
                ],
            ),
        ],
    }
}

fn tariff_tracker() -> EventLogTable {
    EventLogTable {
        columns: vec![
            EventColumn::text(
                "Target",
                &[
                    "China", "China", "EU", "Japan", "Canada", "Mexico", "S. Korea", "India",
                    "China", "All",
                ],
            ),
            EventColumn::text(
                "Sector",
                &[
                    "Semiconductors",
                    "EVs & Batteries",
                    "Steel & Aluminum",
                    "Autos",
                    "Steel & Aluminum",
                    "Autos (pending)",
                    "Steel",
                    "Electronics",
                    "Consumer Goods",
                    "Baseline MFN",
                ],
            ),
            EventColumn::number(
                "US Tariff Rate (%)",
                &[50.0, 100.0, 25.0, 2.5, 25.0, 25.0, 25.0, 3.5, 25.0, 3.4],
            ),
            EventColumn::number(
                "Pre-2025 Rate (%)",
                &[25.0, 27.5, 0.0, 2.5, 0.0, 0.0, 0.0, 3.5, 7.5, 3.4],
            ),
            EventColumn::text(
                "Effective Date",
                &[
                    "2025-06-01", "2025-06-01", "2025-04-01", "Unchanged", "2025-04-01",
                    "Proposed", "2025-04-01", "Unchanged", "2025-01-15", "N/A",
                ],
            ),
            EventColumn::text(
                "Retaliation",
                &[
                    "Yes - Ag",
                    "Yes - Ag",
                    "Yes - Bourbon, Harley",
                    "None",
                    "Yes - Dairy",
                    "TBD",
                    "None",
                    "None",
                    "Yes - LNG",
                    "N/A",
                ],
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::EventValues;

    #[test]
    fn curated_tables_have_expected_sizes() {
        assert_eq!(CuratedTable::PolicyEvents.build().len(), 20);
        assert_eq!(CuratedTable::CentralBankCalendar.build().len(), 10);
        assert_eq!(CuratedTable::TariffTracker.build().len(), 10);
    }

    #[test]
    fn columns_are_rectangular() {
        for table in [
            CuratedTable::PolicyEvents,
            CuratedTable::CentralBankCalendar,
            CuratedTable::TariffTracker,
        ] {
            let SeriesTable::EventLog(log) = table.build() else {
                panic!("curated tables are event logs");
            };
            let n = log.len();
            assert!(log.columns.iter().all(|c| c.values.len() == n), "{table:?}");
        }
    }

    #[test]
    fn event_dates_parse() {
        let SeriesTable::EventLog(log) = CuratedTable::PolicyEvents.build() else {
            panic!("curated tables are event logs");
        };
        let EventValues::Date(d) = &log.columns[0].values else {
            panic!("first column is the event date");
        };
        assert_eq!(d[0], NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(d[19], NaiveDate::from_ymd_opt(2026, 2, 5).unwrap());
    }
}
