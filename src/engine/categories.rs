use crate::error::{Result, ValidationError};
use crate::models::Category;
use crate::store::FinanceStore;

/// Add a shared category. Names are unique ignoring case.
pub fn add_category(store: &impl FinanceStore, name: &str) -> Result<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyCategory.into());
    }
    if store.get_category_by_name(name)?.is_some() {
        return Err(ValidationError::DuplicateCategory(name.to_string()).into());
    }
    let mut category = Category::new(name);
    category.id = Some(store.insert_category(&category)?);
    tracing::info!(category = name, "category added");
    Ok(category)
}

pub fn list_categories(store: &impl FinanceStore) -> Result<Vec<Category>> {
    Ok(store.get_categories()?)
}
