mod common;

use anyhow::Result;

use tenantctl::engine::ResourceEngine;
use tenantctl::pages::{ListPage, ListPhase};
use tenantctl::resource::catalog;
use tenantctl::session::{MemorySessionStore, Session};

// List-page behavior against the fixture backend: pagination envelope math,
// search/ordering/filter params, tenant rejection, selection and bulk delete.

fn lead_engine(backend: &common::FixtureBackend, store: std::sync::Arc<MemorySessionStore>) -> ResourceEngine {
    let client = common::client_for(backend, store.clone());
    ResourceEngine::new(client, store, catalog::find("lead").unwrap())
}

#[tokio::test]
async fn first_page_of_thirty_leads_paginates_as_two_pages() -> Result<()> {
    let backend = common::spawn().await?;
    let mut page = ListPage::new(lead_engine(&backend, common::admin_store()));

    page.load().await?;
    assert_eq!(page.phase(), ListPhase::Ready);

    let table = page.engine().table();
    assert_eq!(table.rows().len(), 25);
    assert_eq!(table.total_items(), 30);

    let info = table.page_info().expect("page info");
    assert_eq!(info.total_pages, 2);
    assert_eq!(info.start_index, 1);
    assert_eq!(info.end_index, 25);

    let rendered = page.render();
    assert!(rendered.contains("Showing 1-25 of 30 (page 1 of 2)"), "footer missing: {}", rendered);
    // Choice columns render the backend's display label.
    assert!(rendered.contains("Novo") || rendered.contains("Contactado"));
    Ok(())
}

#[tokio::test]
async fn second_page_holds_the_remainder() -> Result<()> {
    let backend = common::spawn().await?;
    let mut page = ListPage::new(lead_engine(&backend, common::admin_store()));

    page.load().await?;
    page.go_to_page(2).await?;

    let table = page.engine().table();
    assert_eq!(table.rows().len(), 5);
    let info = table.page_info().expect("page info");
    assert_eq!(info.start_index, 26);
    assert_eq!(info.end_index, 30);
    assert!(!info.has_next);
    Ok(())
}

#[tokio::test]
async fn search_filters_and_resets_to_page_one() -> Result<()> {
    let backend = common::spawn().await?;
    let mut page = ListPage::new(lead_engine(&backend, common::admin_store()));

    page.load().await?;
    page.go_to_page(2).await?;
    assert_eq!(page.engine().table().current_page(), 2);

    page.search("Lead 03").await?;

    let table = page.engine().table();
    assert_eq!(table.current_page(), 1);
    assert_eq!(table.rows().len(), 1);
    assert_eq!(table.rows()[0]["name"], "Lead 03");
    Ok(())
}

#[tokio::test]
async fn ordering_is_applied_server_side() -> Result<()> {
    let backend = common::spawn().await?;
    let mut page = ListPage::new(lead_engine(&backend, common::admin_store()));

    page.sort(Some("-name".to_string())).await?;
    let first = page.engine().table().rows()[0]["name"].as_str().unwrap().to_string();

    page.sort(Some("name".to_string())).await?;
    let now_first = page.engine().table().rows()[0]["name"].as_str().unwrap().to_string();

    assert_eq!(first, "Lead 30");
    assert_eq!(now_first, "Lead 01");
    Ok(())
}

#[tokio::test]
async fn status_filter_narrows_the_result_set() -> Result<()> {
    let backend = common::spawn().await?;
    let mut page = ListPage::new(lead_engine(&backend, common::admin_store()));

    page.engine_mut()
        .table_mut()
        .set_filters(vec![("status".to_string(), "qualified".to_string())]);
    page.load().await?;

    let table = page.engine().table();
    assert!(table.total_items() > 0);
    assert!(table
        .rows()
        .iter()
        .all(|r| r["status"].as_str() == Some("qualified")));
    Ok(())
}

#[tokio::test]
async fn page_size_change_returns_to_page_one() -> Result<()> {
    let backend = common::spawn().await?;
    let mut page = ListPage::new(lead_engine(&backend, common::admin_store()));

    page.load().await?;
    page.go_to_page(2).await?;
    page.resize_page(10).await?;

    let table = page.engine().table();
    assert_eq!(table.current_page(), 1);
    assert_eq!(table.rows().len(), 10);
    assert_eq!(table.page_info().unwrap().total_pages, 3);
    Ok(())
}

#[tokio::test]
async fn missing_tenant_header_fails_with_the_backend_message() -> Result<()> {
    let backend = common::spawn().await?;
    // Authenticated but no active company: the backend denies the request.
    let store = std::sync::Arc::new(MemorySessionStore::new(Session {
        user: None,
        access_token: Some(common::ADMIN_TOKEN.to_string()),
        company: None,
        logged_in_at: None,
    }));
    let mut page = ListPage::new(lead_engine(&backend, store));

    let err = page.load().await.unwrap_err();
    assert_eq!(err.message(), "Acesso negado");
    assert_eq!(page.phase(), ListPhase::Failed);

    let table = page.engine().table();
    assert!(table.rows().is_empty());
    assert_eq!(table.total_items(), 0);
    assert_eq!(table.error(), Some("Acesso negado"));
    assert!(!table.is_loading());
    assert!(page.render().contains("Acesso negado"));
    Ok(())
}

#[tokio::test]
async fn bulk_delete_removes_selection_and_refreshes() -> Result<()> {
    let backend = common::spawn().await?;
    let mut page = ListPage::new(lead_engine(&backend, common::admin_store()));

    page.resize_page(5).await?;
    page.engine_mut().table_mut().select_all(true);
    assert_eq!(page.engine().table().selected_rows().len(), 5);

    let outcome = page
        .bulk_delete(|count| {
            assert_eq!(count, 5);
            true
        })
        .await?
        .expect("selection was not empty");

    assert!(outcome.all_succeeded());
    assert_eq!(outcome.deleted.len(), 5);

    let table = page.engine().table();
    assert!(table.selected_rows().is_empty());
    assert_eq!(table.total_items(), 25);
    Ok(())
}

#[tokio::test]
async fn declined_confirmation_leaves_everything_in_place() -> Result<()> {
    let backend = common::spawn().await?;
    let mut page = ListPage::new(lead_engine(&backend, common::admin_store()));

    page.load().await?;
    page.engine_mut().table_mut().select_all(true);

    let outcome = page.bulk_delete(|_| false).await?;
    assert!(outcome.is_none());
    assert_eq!(page.engine().table().total_items(), 30);
    assert!(!page.engine().table().selected_rows().is_empty());
    Ok(())
}
