//! # SQL Agent Example
//!
//! A tool-calling model turns a product search request into SQL and hands it
//! to the `search_product` tool. The tool answers with canned rows instead of
//! querying a database; the first tool message is parsed back into a typed
//! response.
//!
//! Requires `OPENAI_API_KEY` (plus optional `OPENAI_BASE_URL`, `OPENAI_MODEL_NAME`).
//!
//! Run: `cargo run -p ragkit-demos --example sql_agent -- "your search"`

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use ragkit_model::{OpenAIChatModel, OpenAIConfig};
use ragkit_rag::{ChatTemplate, TASK_KEY};
use ragkit_tool::{FunctionTool, ToolAgent, ToolsNode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

const SYSTEM_PROMPT: &str = "You are an SQL expert.";

const USER_TEMPLATE: &str = "Product search. The product table has the columns id, name, color, \
price, comment_num and is_deleted. Only select products that are not deleted, i.e. \
is_deleted=false. Paginate with 10 rows per page and only fetch the first page. Request: ";

const DEFAULT_REQUEST: &str =
    "red phone cases with between 20 and 30 comments and a price of at most 50";

#[derive(Debug, Deserialize)]
struct SearchProductParams {
    sql: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SearchProductsResponse {
    success: bool,
    message: String,
    products: Vec<HashMap<String, Value>>,
}

async fn search_product(params: SearchProductParams) -> ragkit_core::Result<SearchProductsResponse> {
    info!(sql = %params.sql, "model generated SQL");
    // A real implementation would run params.sql against the database.
    let products = [
        json!({"id": 1, "name": "Phone case 1", "color": "red", "price": 50, "comment_num": 120, "is_deleted": false}),
        json!({"id": 2, "name": "Phone case 2", "color": "red", "price": 40, "comment_num": 130, "is_deleted": false}),
    ]
    .into_iter()
    .map(serde_json::from_value)
    .collect::<Result<Vec<_>, _>>()
    .map_err(|e| ragkit_core::RagError::tool("search_product", e.to_string()))?;

    Ok(SearchProductsResponse { success: true, message: "query succeeded".to_string(), products })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ragkit_demos::init("sql-agent");

    let request = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_REQUEST.to_string());

    let search = FunctionTool::typed(
        "search_product",
        "Search products based on the user's requirements",
        search_product,
    )
    .with_parameters(json!({
        "type": "object",
        "properties": {
            "sql": { "type": "string", "description": "SQL for searching products." }
        },
        "required": ["sql"]
    }));

    let model = OpenAIChatModel::new(OpenAIConfig::from_env()?)?;
    let agent = ToolAgent::new(Arc::new(model), ToolsNode::new(vec![Arc::new(search)])?)
        .with_temperature(0.7);

    let template = ChatTemplate::new().system(SYSTEM_PROMPT).user("{task}");
    let messages =
        template.render(&HashMap::from([(TASK_KEY.to_string(), format!("{USER_TEMPLATE}{request}"))]))?;

    let results = agent.call_tools(messages).await?;
    let first = results.first().context("agent returned no messages")?;
    let response: SearchProductsResponse = serde_json::from_str(&first.content)
        .with_context(|| format!("tool result is not a product list: {}", first.content))?;

    println!("products: {:#?}", response.products);
    Ok(())
}
