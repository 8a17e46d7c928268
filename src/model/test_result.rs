//! Test reports attached to builds.

use super::json;
use crate::error::Result;
use serde_json::Value;

/// A single test case
#[derive(Clone, Debug)]
pub struct TestCase {
    /// Class the case belongs to
    pub class_name: Option<String>,
    /// The case's name
    pub name: Option<String>,
    /// Status string such as "PASSED" or "FAILED"
    pub status: Option<String>,
    /// Error details for failed cases
    pub error_details: Option<String>,
}

impl TestCase {
    fn parse(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(TestCase {
            class_name: json::optional_str(object, "className"),
            name: json::optional_str(object, "name"),
            status: json::optional_str(object, "status"),
            error_details: json::optional_str(object, "errorDetails"),
        })
    }
}

/// A suite of test cases
#[derive(Clone, Debug)]
pub struct TestSuite {
    /// The suite's name
    pub name: Option<String>,
    /// Cases in the suite
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    fn parse(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(TestSuite {
            name: json::optional_str(object, "name"),
            cases: json::array_or_empty(object, "cases")
                .iter()
                .filter_map(TestCase::parse)
                .collect(),
        })
    }
}

/// A build's test report
///
/// Every field is optional on the wire; an empty report is a valid report.
#[derive(Clone, Debug, Default)]
pub struct TestResult {
    /// Number of failed cases
    pub fail_count: Option<u64>,
    /// Number of passed cases
    pub pass_count: Option<u64>,
    /// Number of skipped cases
    pub skip_count: Option<u64>,
    /// Total number of cases
    pub total_count: Option<u64>,
    /// All suites in the report
    pub suites: Vec<TestSuite>,
}

impl TestResult {
    /// Loose-decode a test report payload.
    pub fn parse(value: &Value) -> Result<Self> {
        let object = json::as_object(value)?;
        Ok(TestResult {
            fail_count: json::optional_u64(object, "failCount"),
            pass_count: json::optional_u64(object, "passCount"),
            skip_count: json::optional_u64(object, "skipCount"),
            total_count: json::optional_u64(object, "totalCount"),
            suites: json::array_or_empty(object, "suites")
                .iter()
                .filter_map(TestSuite::parse)
                .collect(),
        })
    }
}
