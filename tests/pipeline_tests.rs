//! End-to-end tests of the named pipelines over the sample snapshot.


use chrono::NaiveDate;
use serde_json::json;
use sieve_core::config::EngineConfig;
use sieve_core::model::{DataSource, Money};
use sieve_exec::{Catalog, Engine};
use sieve_operators::PriceBracket;
use test_data_gen::{customer, date, order, product, sample_source, supplier};

fn engine(source: &DataSource) -> Engine<'_> {
    Engine::new(EngineConfig::default(), source).expect("default config is valid")
}

#[test]
fn test_turnover_tiers() {
    let source = sample_source();
    let tiers = engine(&source).turnover_tiers().to_vec();
    let thresholds: Vec<i64> = tiers.iter().map(|t| t.threshold).collect();
    assert_eq!(thresholds, vec![3468, 4624, 6936, 13873]);
    for tier in &tiers[..3] {
        let ids: Vec<_> = tier.customers.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["QUICK"]);
    }
    assert!(tiers[3].customers.is_empty());
}

#[test]
fn test_shared_locations_and_join() {
    let source = sample_source();
    let engine = engine(&source);

    let locations = engine.shared_locations().to_vec();
    assert_eq!(locations.len(), 1);
    assert_eq!((locations[0].city, locations[0].country), ("London", "UK"));

    // one London customer, two London suppliers
    let pairs: Vec<_> = engine
        .customer_suppliers()
        .iter()
        .map(|p| (p.customer_name, p.supplier_name))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("Around the Horn", "Exotic Liquids"),
            ("Around the Horn", "Specialty Biscuits"),
        ]
    );
}

#[test]
fn test_join_without_matches_is_empty() {
    let source = DataSource::new(
        vec![customer("A", "A", "Oslo", "Norway", vec![])],
        vec![supplier("S", "Oslo", "Sweden")],
        vec![],
    );
    assert!(engine(&source).customer_suppliers().to_vec().is_empty());
    assert!(engine(&source).shared_locations().to_vec().is_empty());
}

#[test]
fn test_join_n_by_m() {
    let source = DataSource::new(
        vec![
            customer("A", "A", "Oslo", "Norway", vec![]),
            customer("B", "B", "Oslo", "Norway", vec![]),
            customer("C", "C", "Bergen", "Norway", vec![]),
        ],
        vec![
            supplier("S1", "Oslo", "Norway"),
            supplier("S2", "Oslo", "Norway"),
            supplier("S3", "Oslo", "Norway"),
        ],
        vec![],
    );
    assert_eq!(engine(&source).customer_suppliers().to_vec().len(), 2 * 3);
}

#[test]
fn test_large_orders_and_invalid_contacts() {
    let source = sample_source();
    let engine = engine(&source);
    let large: Vec<_> = engine
        .customers_with_large_orders()
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(large, vec!["QUICK"]);

    let invalid: Vec<_> = engine.invalid_contacts().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(invalid, vec!["AROUT", "BONAP"]);
}

#[test]
fn test_first_order_dates() {
    let source = DataSource::new(
        vec![
            customer("A", "A", "X", "Y", vec![order(1, date(2020, 1, 10), 10_000)]),
            customer("B", "B", "X", "Y", vec![]),
        ],
        vec![],
        vec![],
    );
    let rows = engine(&source).first_orders().to_vec();
    assert_eq!(rows[0].date, date(2020, 1, 10));
    assert_eq!(rows[1].date, NaiveDate::MIN);
}

#[test]
fn test_customer_activity_ordering() {
    let source = sample_source();
    let rows = engine(&source).customer_activity().to_vec();
    let names: Vec<_> = rows.iter().map(|r| r.name).collect();
    assert_eq!(
        names,
        vec!["Berlin Idle", "QUICK-Stop", "Bon app'", "Around the Horn", "Alfreds Futterkiste"]
    );
    assert_eq!(rows[1].money_flow, Money::from_cents(1_387_300));
}

#[test]
fn test_customer_activity_ties_break_on_money_then_name() {
    let d = date(2021, 1, 1);
    let source = DataSource::new(
        vec![
            customer("1", "Beta", "X", "Y", vec![order(1, d, 500)]),
            customer("2", "Alpha", "X", "Y", vec![order(2, d, 500)]),
            customer("3", "Gamma", "X", "Y", vec![order(3, d, 900)]),
        ],
        vec![],
        vec![],
    );
    let names: Vec<_> = engine(&source)
        .customer_activity()
        .iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["Gamma", "Alpha", "Beta"]);
}

#[test]
fn test_products_by_category_and_stock() {
    let source = sample_source();
    let groups = engine(&source).products_by_category_and_stock().to_vec();
    let categories: Vec<_> = groups.iter().map(|g| g.category).collect();
    assert_eq!(categories, vec!["Beverages", "Condiments", "Seafood"]);

    let beverages: Vec<(u32, Vec<&str>)> = groups[0]
        .units_in_stock
        .iter()
        .map(|s| (s.count, s.products.iter().map(|p| p.name.as_str()).collect()))
        .collect();
    assert_eq!(
        beverages,
        vec![
            (39, vec!["Chai"]),
            (17, vec!["Ipoh Coffee", "Chang"]),
            (15, vec!["Outback Lager"]),
        ]
    );
}

#[test]
fn test_price_brackets() {
    let source = sample_source();
    let groups = engine(&source).products_by_price_bracket().to_vec();
    let shape: Vec<(PriceBracket, Vec<&str>)> = groups
        .iter()
        .map(|g| (g.category, g.products.iter().map(|p| p.name.as_str()).collect()))
        .collect();
    assert_eq!(
        shape,
        vec![
            (PriceBracket::Cheap, vec!["Aniseed Syrup", "Chai", "Chang"]),
            // 20.00 sits on the boundary and goes up
            (
                PriceBracket::Average,
                vec!["Outback Lager", "Chef Anton's Gumbo Mix", "Ikura"]
            ),
            (PriceBracket::Expensive, vec!["Ipoh Coffee", "Carnarvon Tigers"]),
        ]
    );
}

#[test]
fn test_price_bracket_scenario() {
    let source = DataSource::new(
        vec![],
        vec![],
        vec![
            product(1, "p15", "A", 1, 1_500),
            product(2, "p25", "A", 1, 2_500),
            product(3, "p45", "A", 1, 4_500),
        ],
    );
    let groups = engine(&source).products_by_price_bracket().to_vec();
    let shape: Vec<_> = groups
        .iter()
        .map(|g| (g.category, g.products.len(), g.products[0].name.as_str()))
        .collect();
    assert_eq!(
        shape,
        vec![
            (PriceBracket::Cheap, 1, "p15"),
            (PriceBracket::Average, 1, "p25"),
            (PriceBracket::Expensive, 1, "p45"),
        ]
    );
}

#[test]
fn test_city_statistics_count_zero_order_customers() {
    let source = sample_source();
    let stats: Vec<_> = engine(&source)
        .city_statistics()
        .iter()
        .map(|s| (s.city, s.income, s.intensity))
        .collect();
    assert_eq!(
        stats,
        vec![
            ("Berlin", 1011, 1),
            ("London", 1379, 2),
            ("Cunewalde", 13873, 2),
            ("Marseille", 88, 1),
        ]
    );
}

#[test]
fn test_city_income_is_an_exact_mean() {
    let on = date(1997, 1, 2);
    let source = DataSource::new(
        vec![
            customer("A", "A", "Graz", "Austria", vec![order(1, on, 1)]),
            customer("B", "B", "Graz", "Austria", vec![order(2, on, 201)]),
            customer("C", "C", "Graz", "Austria", vec![order(3, on, 98), order(4, on, 0)]),
        ],
        vec![],
        vec![],
    );
    let stats = engine(&source).city_statistics().to_vec();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].income, 1);
    // (1 + 1 + 2) / 3
    assert_eq!(stats[0].intensity, 1);
}

#[test]
fn test_orders_by_period() {
    let source = sample_source();
    let engine = engine(&source);

    let by_ym: Vec<_> = engine
        .orders_by_year_month()
        .iter()
        .map(|r| (r.date_time, r.count_of_orders))
        .collect();
    let expected: Vec<(String, usize)> = [
        ("1996-08", 2),
        ("1996-10", 1),
        ("1996-11", 1),
        ("1996-12", 1),
        ("1997-08", 1),
        ("1997-10", 2),
    ]
    .iter()
    .map(|(p, n)| (p.to_string(), *n))
    .collect();
    assert_eq!(by_ym, expected);

    let by_year: Vec<_> = engine
        .orders_by_year()
        .iter()
        .map(|r| (r.year, r.count_of_orders))
        .collect();
    assert_eq!(by_year, vec![(1996, 5), (1997, 3)]);

    let by_month: Vec<_> = engine
        .orders_by_month()
        .iter()
        .map(|r| (r.month, r.count_of_orders))
        .collect();
    assert_eq!(by_month, vec![("Aug", 3), ("Oct", 3), ("Nov", 1), ("Dec", 1)]);
}

#[test]
fn test_year_month_scenario() {
    let source = DataSource::new(
        vec![customer(
            "A",
            "A",
            "X",
            "Y",
            vec![
                order(1, date(2021, 3, 5), 100),
                order(2, date(2021, 3, 9), 100),
            ],
        )],
        vec![],
        vec![],
    );
    let rows = engine(&source).orders_by_year_month().to_vec();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date_time, "2021-03");
    assert_eq!(rows[0].count_of_orders, 2);
}

#[test]
fn test_pipelines_are_restartable() {
    let source = sample_source();
    let engine = engine(&source);
    let query = engine.customer_activity();
    let first: Vec<_> = query.iter().map(|r| r.name).collect();
    let second: Vec<_> = query.iter().map(|r| r.name).collect();
    assert_eq!(first, second);

    // a partial pass does not disturb the next full one
    assert_eq!(query.iter().take(1).count(), 1);
    assert_eq!(query.iter().count(), 5);
}

#[test]
fn test_runs_never_mutate_the_source() {
    let source = sample_source();
    let before = source.fingerprint().unwrap();
    let engine = engine(&source);
    let catalog = Catalog::standard();
    for info in catalog.list() {
        catalog.run(info.name, &engine).unwrap();
    }
    assert_eq!(source.fingerprint().unwrap(), before);
    assert_eq!(source, sample_source());
}

#[test]
fn test_catalog_sections_encode_rows() {
    let source = sample_source();
    let engine = engine(&source);
    let catalog = Catalog::standard();

    let linq4 = catalog.run("linq4", &engine).unwrap();
    assert_eq!(linq4.len(), 1);
    assert_eq!(linq4[0].title, None);
    assert_eq!(
        linq4[0].rows[0],
        json!({"name": "Alfreds Futterkiste", "date": "1997-08-25"})
    );

    let linq8 = catalog.run("linq8", &engine).unwrap();
    assert_eq!(linq8[0].rows[1]["category"], json!("average"));

    let linq10 = catalog.run("linq10", &engine).unwrap();
    let titles: Vec<_> = linq10.iter().filter_map(|s| s.title.as_deref()).collect();
    assert_eq!(titles, vec!["by year and month", "by year", "by month"]);
    assert_eq!(
        linq10[0].rows[0],
        json!({"date_time": "1996-08", "count_of_orders": 2})
    );
}

#[test]
fn test_config_changes_bracket_limits() {
    let source = sample_source();
    let cfg = EngineConfig {
        average_limit: 10,
        expensive_limit: 100,
        ..EngineConfig::default()
    };
    let engine = Engine::new(cfg, &source).unwrap();
    let groups = engine.products_by_price_bracket().to_vec();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].category, PriceBracket::Average);
    assert_eq!(groups[0].products.len(), 8);
}
