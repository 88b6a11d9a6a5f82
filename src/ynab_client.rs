use log::debug;
use serde::de::DeserializeOwned;

use crate::api_client::*;
use crate::errors::*;
use crate::types::*;

pub struct YnabClient<'a> {
    api: &'a YnabApiClient,
}

impl<'a> YnabClient<'a> {
    pub fn new(api: &'a YnabApiClient) -> YnabClient<'a> {
        YnabClient { api }
    }

    pub fn fetch_user(&self, access_token: &str) -> Result<User> {
        Ok(self
            .get_data::<UserData>("/user", access_token)?
            .user)
    }

    pub fn fetch_budgets(&self, access_token: &str) -> Result<Vec<BudgetSummary>> {
        let budgets = self
            .get_data::<BudgetsData>("/budgets", access_token)?
            .budgets;
        debug!("Budgets received from YNAB: {:#?}", &budgets);
        Ok(budgets)
    }

    pub fn fetch_categories(
        &self,
        access_token: &str,
        budget_id: &YnabBudgetId,
    ) -> Result<Vec<Category>> {
        let category_groups = self
            .get_data::<CategoryGroupsData>(
                &format!("/budgets/{}/categories", budget_id),
                access_token,
            )?
            .category_groups;
        debug!("Category groups received from YNAB: {:#?}", &category_groups);
        Ok(flatten_category_groups(category_groups))
    }

    /// YNAB has no per-category paging, so the whole budget's transactions are
    /// fetched and paged here after filtering by category.
    pub fn fetch_transactions(
        &self,
        access_token: &str,
        budget_id: &YnabBudgetId,
        category_id: &YnabCategoryId,
        page: usize,
        page_size: usize,
    ) -> Result<TransactionsPage> {
        let transactions = self
            .get_data::<TransactionsData>(
                &format!("/budgets/{}/transactions", budget_id),
                access_token,
            )?
            .transactions;
        debug!(
            "{} transactions received from YNAB for budget {}",
            transactions.len(),
            budget_id
        );
        Ok(page_transactions(transactions, category_id, page, page_size))
    }

    fn get_data<T: DeserializeOwned>(&self, endpoint: &str, access_token: &str) -> Result<T> {
        let response: ApiResponse<T> =
            self.api
                .request(endpoint, RequestOptions::get(), Some(access_token))?;
        unwrap_envelope(response)
    }
}

fn unwrap_envelope<T>(response: ApiResponse<T>) -> Result<T> {
    if let Some(error) = response.error {
        bail!(ErrorKind::ApiError(None, error.detail));
    }
    response
        .data
        .ok_or_else(|| ErrorKind::DecodeError("response is missing data".to_string()).into())
}

fn flatten_category_groups(category_groups: Vec<CategoryGroup>) -> Vec<Category> {
    category_groups
        .into_iter()
        .flat_map(|group| {
            let group_name = group.name;
            group.categories.into_iter().map(move |mut category| {
                if category.category_group_name.is_empty() {
                    category.category_group_name = group_name.clone();
                }
                category
            })
        })
        .collect()
}

fn page_transactions(
    transactions: Vec<Transaction>,
    category_id: &YnabCategoryId,
    page: usize,
    page_size: usize,
) -> TransactionsPage {
    let matching: Vec<Transaction> = transactions
        .into_iter()
        .filter(|transaction| transaction.category_id.as_ref() == Some(category_id))
        .collect();
    let total = matching.len();
    let offset = page.saturating_sub(1).saturating_mul(page_size);
    let items = matching.into_iter().skip(offset).take(page_size).collect();
    TransactionsPage { items, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::tests::*;
    use chrono::NaiveDate;

    const BUDGET_ID: &str = "b1";

    fn transaction(id: &str, category_id: Option<&str>) -> Transaction {
        Transaction {
            id: YnabTransactionId(id.to_string()),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            amount: -1000,
            memo: None,
            cleared: "cleared".to_string(),
            approved: true,
            category_id: category_id.map(YnabCategoryId::new),
            payee_name: None,
            deleted: false,
        }
    }

    fn transaction_ids(page: &TransactionsPage) -> Vec<&str> {
        page.items.iter().map(|t| t.id.0.as_str()).collect()
    }

    #[test]
    fn test_fetch_budgets_unwraps_envelope() {
        let transport = MockTransport::new();
        transport.respond(
            200,
            "OK",
            r#"{"data": {"budgets": [{"id": "b1", "name": "Household"}], "default_budget": null}}"#,
        );
        let api = transport.client(test_limiter());
        let budgets = YnabClient::new(&api).fetch_budgets(TEST_TOKEN).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].id, YnabBudgetId::new("b1"));
        assert_eq!(budgets[0].name, "Household");
        assert_eq!(
            transport.requests.borrow()[0].url,
            "https://api.ynab.com/v1/budgets"
        );
    }

    #[test]
    fn test_envelope_error_is_api_error_with_detail() {
        let transport = MockTransport::new();
        transport.respond(
            200,
            "OK",
            r#"{"data": null, "error": {"id": "404.2", "name": "resource_not_found", "detail": "Budget not found"}}"#,
        );
        let api = transport.client(test_limiter());
        let err = YnabClient::new(&api)
            .fetch_categories(TEST_TOKEN, &YnabBudgetId::new(BUDGET_ID))
            .unwrap_err();
        match err.kind() {
            ErrorKind::ApiError(status, detail) => {
                assert_eq!(*status, None);
                assert_eq!(detail, "Budget not found");
            }
            other => panic!("Expected ApiError, got {:?}", other),
        }
        assert_eq!(err.to_string(), "YNAB API error: Budget not found");
    }

    #[test]
    fn test_missing_data_is_decode_error() {
        let response: ApiResponse<BudgetsData> = ApiResponse {
            data: None,
            error: None,
        };
        match unwrap_envelope(response) {
            Err(Error(ErrorKind::DecodeError(_), _)) => (),
            other => panic!("Expected DecodeError, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_categories_flattens_groups() {
        let transport = MockTransport::new();
        transport.respond(
            200,
            "OK",
            r#"{"data": {"category_groups": [
                {"id": "g1", "name": "Monthly:High:Fixed", "hidden": false, "deleted": false, "categories": [
                    {"id": "c1", "name": "Rent", "category_group_id": "g1", "budgeted": 1000, "activity": 0, "balance": 1000},
                    {"id": "c2", "name": "Internet", "category_group_id": "g1", "category_group_name": "Monthly:Medium:Fixed", "budgeted": 60, "activity": 0, "balance": 60}
                ]},
                {"id": "g2", "name": "Empty", "hidden": false, "deleted": false, "categories": []},
                {"id": "g3", "name": "Weekly:Low:Variable", "hidden": false, "deleted": false, "categories": [
                    {"id": "c3", "name": "Fun", "category_group_id": "g3", "budgeted": 150, "activity": 0, "balance": 150}
                ]}
            ]}}"#,
        );
        let api = transport.client(test_limiter());
        let categories = YnabClient::new(&api)
            .fetch_categories(TEST_TOKEN, &YnabBudgetId::new(BUDGET_ID))
            .unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Internet", "Fun"]);
        assert_eq!(categories[0].category_group_name, "Monthly:High:Fixed");
        assert_eq!(categories[1].category_group_name, "Monthly:Medium:Fixed");
        assert_eq!(categories[2].category_group_name, "Weekly:Low:Variable");
        assert_eq!(
            transport.requests.borrow()[0].url,
            "https://api.ynab.com/v1/budgets/b1/categories"
        );
    }

    #[test]
    fn test_fetch_transactions_filters_then_pages() {
        let transport = MockTransport::new();
        transport.respond(
            200,
            "OK",
            r#"{"data": {"server_knowledge": 1, "transactions": [
                {"id": "t1", "date": "2024-01-01", "amount": -1000, "cleared": "cleared", "approved": true, "category_id": "c1"},
                {"id": "t2", "date": "2024-01-02", "amount": -2000, "cleared": "uncleared", "approved": false, "category_id": "c2"},
                {"id": "t3", "date": "2024-01-03", "amount": -3000, "memo": "snacks", "cleared": "cleared", "approved": true, "category_id": "c1"},
                {"id": "t4", "date": "2024-01-04", "amount": -4000, "cleared": "reconciled", "approved": true, "category_id": null},
                {"id": "t5", "date": "2024-01-05", "amount": -5000, "cleared": "cleared", "approved": true, "category_id": "c1"}
            ]}}"#,
        );
        let api = transport.client(test_limiter());
        let page = YnabClient::new(&api)
            .fetch_transactions(
                TEST_TOKEN,
                &YnabBudgetId::new(BUDGET_ID),
                &YnabCategoryId::new("c1"),
                2,
                2,
            )
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(transaction_ids(&page), vec!["t5"]);
        assert_eq!(
            transport.requests.borrow()[0].url,
            "https://api.ynab.com/v1/budgets/b1/transactions"
        );
    }

    #[test]
    fn test_page_transactions_edges() {
        let transactions = vec![
            transaction("t1", Some("c1")),
            transaction("t2", Some("c1")),
            transaction("t3", Some("c2")),
        ];
        let category_id = YnabCategoryId::new("c1");

        let first = page_transactions(transactions.clone(), &category_id, 1, 25);
        assert_eq!(transaction_ids(&first), vec!["t1", "t2"]);
        assert_eq!(first.total, 2);

        let past_end = page_transactions(transactions.clone(), &category_id, 3, 1);
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 2);

        let page_zero = page_transactions(transactions.clone(), &category_id, 0, 1);
        assert_eq!(transaction_ids(&page_zero), vec!["t1"]);

        let empty_size = page_transactions(transactions, &category_id, 1, 0);
        assert!(empty_size.items.is_empty());
        assert_eq!(empty_size.total, 2);
    }

    #[test]
    fn test_fetch_user() {
        let transport = MockTransport::new();
        transport.respond(200, "OK", r#"{"data": {"user": {"id": "u1"}}}"#);
        let api = transport.client(test_limiter());
        let user = YnabClient::new(&api).fetch_user(TEST_TOKEN).unwrap();
        assert_eq!(user.id, "u1");
    }
}
