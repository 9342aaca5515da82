#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;

use cryptotab_core::catalog::{COLUMN_NAME_COLUMN, TABLE_NAME_COLUMN};
use cryptotab_core::config::ConnectionParams;
use cryptotab_core::{
    CoinMarketCapHandler, ConnectionConfig, DataHandler, DefiLlamaHandler, ProviderId,
};
use serde_json::Value;

use support::{ok, ScriptedHttpClient};

struct HandlerCase {
    id: ProviderId,
    handler: Arc<dyn DataHandler>,
    client: Arc<ScriptedHttpClient>,
    keywords: &'static [&'static str],
    tables: &'static [&'static str],
}

fn handler_cases() -> Vec<HandlerCase> {
    let cmc_client = ScriptedHttpClient::new();
    cmc_client.respond("listings/latest", ok(r#"{"data":[]}"#));
    cmc_client.respond("quotes/latest", ok(r#"{"data":{}}"#));
    cmc_client.respond("ohlcv/historical", ok(r#"{"data":{"id":1,"quotes":[]}}"#));
    let cmc_config = ConnectionConfig::new(
        ProviderId::CoinMarketCap,
        ConnectionParams {
            api_key: Some(String::from("contract-key")),
            symbols: Some(vec![String::from("BTC")]),
            ..ConnectionParams::default()
        },
    )
    .expect("valid config");

    let llama_client = ScriptedHttpClient::new();
    llama_client.respond("protocols", ok("[]"));
    llama_client.respond("charts", ok("[]"));
    llama_client.respond("chains", ok("[]"));
    llama_client.respond("yields", ok(r#"{"status":"success","data":[]}"#));

    vec![
        HandlerCase {
            id: ProviderId::CoinMarketCap,
            handler: Arc::new(
                CoinMarketCapHandler::with_http_client(cmc_config, cmc_client.clone())
                    .expect("valid handler"),
            ),
            client: cmc_client,
            keywords: &["listings", "quotes", "ohlcv"],
            tables: &["listings", "quotes", "ohlcv", "market_metrics", "global_metrics"],
        },
        HandlerCase {
            id: ProviderId::DefiLlama,
            handler: Arc::new(
                DefiLlamaHandler::with_http_client(
                    ConnectionConfig::defaults(ProviderId::DefiLlama),
                    llama_client.clone(),
                )
                .expect("valid handler"),
            ),
            client: llama_client,
            keywords: &["protocols", "tvl", "chains", "yields"],
            tables: &["protocols", "tvl", "chains", "yields", "stablecoins", "fees"],
        },
    ]
}

fn strings(values: Option<Vec<&Value>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| value.as_str().map(str::to_owned))
        .collect()
}

#[test]
fn handlers_report_their_provider_and_keywords() {
    for case in handler_cases() {
        assert_eq!(case.handler.id(), case.id);
        assert_eq!(case.handler.keywords(), case.keywords, "provider '{}'", case.id);
    }
}

#[tokio::test]
async fn every_keyword_dispatches_exactly_one_request() {
    for case in handler_cases() {
        for (index, keyword) in case.keywords.iter().enumerate() {
            let query = format!("please fetch {} now", keyword.to_uppercase());
            let response = case.handler.native_query(&query).await;

            assert!(
                !response.is_error(),
                "provider '{}' keyword '{keyword}': {:?}",
                case.id,
                response.error_message()
            );
            assert_eq!(
                case.client.requests().len(),
                index + 1,
                "provider '{}' keyword '{keyword}' must issue one request",
                case.id
            );
        }
    }
}

#[test]
fn table_listing_is_single_column_in_declaration_order() {
    for case in handler_cases() {
        let table = case.handler.get_tables().into_table().expect("tables");
        assert_eq!(table.columns(), [TABLE_NAME_COLUMN]);
        assert_eq!(strings(table.column_values(TABLE_NAME_COLUMN)), case.tables);
    }
}

#[test]
fn every_declared_table_answers_column_metadata() {
    for case in handler_cases() {
        for table_name in case.tables {
            let first = case.handler.get_columns(table_name);
            let second = case.handler.get_columns(table_name);
            assert_eq!(first, second, "provider '{}' table '{table_name}'", case.id);

            let table = first.into_table().expect("column listing");
            assert_eq!(table.columns(), [COLUMN_NAME_COLUMN]);
        }

        let unknown = case.handler.get_columns("nope").into_table().expect("table");
        assert!(unknown.is_empty(), "provider '{}'", case.id);
    }
}

#[test]
fn metadata_results_serialize_with_table_tag() {
    for case in handler_cases() {
        let value = serde_json::to_value(case.handler.get_tables()).expect("serializes");
        assert_eq!(value["type"], "table");
        assert_eq!(value["columns"][0], TABLE_NAME_COLUMN);
        assert!(value.get("error_message").is_none());
    }
}
