use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A value bound to a variable, or returned as an answer. The service sends
/// either strings or JSON numbers and expects them back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Number(n) => write!(f, "{n}"),
            VariableValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::Text(value.to_string())
    }
}

impl From<i64> for VariableValue {
    fn from(value: i64) -> Self {
        VariableValue::Number(value.into())
    }
}

/// Body of `POST /calculate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub image: String,
    pub dict_of_vars: BTreeMap<String, VariableValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub data: Vec<ResponseItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseItem {
    pub expr: String,
    pub result: VariableValue,
    #[serde(default)]
    pub assign: bool,
}

/// One recognized expression, in the order the service returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationResult {
    pub expression: String,
    pub answer: VariableValue,
    pub is_assignment: bool,
}

impl EvaluationResult {
    pub fn new(expression: impl Into<String>, answer: impl Into<VariableValue>, is_assignment: bool) -> Self {
        Self {
            expression: expression.into(),
            answer: answer.into(),
            is_assignment,
        }
    }
}

impl From<ResponseItem> for EvaluationResult {
    fn from(item: ResponseItem) -> Self {
        Self {
            expression: item.expr,
            answer: item.result,
            is_assignment: item.assign,
        }
    }
}

impl EvaluationResponse {
    pub fn into_results(self) -> Vec<EvaluationResult> {
        self.data.into_iter().map(EvaluationResult::from).collect()
    }
}
