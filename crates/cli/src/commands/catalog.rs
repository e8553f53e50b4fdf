//! Package catalogue.

use petalbox_core::{PackageView, filter_by_query};

use super::Context;
use crate::output::{emit, money, table};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

fn package_rows(packages: &[PackageView]) -> Vec<Vec<String>> {
    packages
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.name.clone(),
                money(p.price),
                p.duration_label.clone(),
                if p.is_orderable() { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect()
}

pub async fn list(ctx: &Context, query: &str) -> CommandResult {
    let packages = ctx.client.list_packages().await?;
    let visible = filter_by_query(&packages, query);
    emit(table(
        &["ID", "NAME", "PRICE", "DURATION", "ORDERABLE"],
        &package_rows(&visible),
    ))?;
    emit(format!("{} of {} packages", visible.len(), packages.len()))?;
    Ok(())
}

pub async fn show(ctx: &Context, id: &str) -> CommandResult {
    let package = ctx.client.get_package(id).await?;
    emit(format!("{} ({})", package.name, money(package.price)))?;
    emit(format!("Duration: {}", package.duration_label))?;
    emit(&package.description)?;
    if !package.flowers.is_empty() {
        emit(format!("Flowers: {}", package.flowers.join(", ")))?;
    }
    if let Some(image) = &package.image_url {
        emit(format!("Image: {image}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use petalbox_core::normalize_package;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_inactive_package_not_orderable() {
        let packages = vec![
            normalize_package(&json!({"id": "p1", "name": "Weekly Bloom", "price": 350000, "isActive": false})),
        ];
        let rows = package_rows(&packages);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first().and_then(|r| r.last()).map(String::as_str), Some("no"));
    }
}
