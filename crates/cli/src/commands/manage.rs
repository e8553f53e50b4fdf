//! Back-office list boards and status changes.

use chrono::Utc;
use clap::Subcommand;
use petalbox_client::ListPage;
use petalbox_client::api::ContactLog;
use petalbox_core::{
    CustomerStatus, CustomerSummary, CustomerView, DeliveryStatus, DeliveryView, HasStatus,
    NormalizedStatus, OrderStatus, OrderView, RequiredRole, Searchable,
};
use rust_decimal::Decimal;

use super::{CommandError, Context, ListArgs, Surface, parse_status, settle};
use crate::output::{emit, money, summary_line, table};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Subcommand)]
pub enum StatusTarget {
    /// Move an order through its lifecycle
    Order {
        id: String,

        /// pending, confirmed, processing, shipping, delivered, cancelled
        status: String,

        #[arg(long, value_enum, default_value_t = Surface::Staff)]
        surface: Surface,
    },

    /// Move a delivery through its lifecycle
    Delivery {
        id: String,

        /// pending, in_progress, completed, cancelled
        status: String,
    },

    /// Activate or deactivate a customer
    Customer {
        id: String,

        /// active or inactive
        status: String,
    },
}

fn load_failed<T: HasStatus + Searchable + Clone>(page: &ListPage<T>) -> CommandError {
    CommandError::Page(page.error().unwrap_or("Could not load the list").to_string())
}

fn apply_filters<T: HasStatus + Searchable + Clone>(page: &mut ListPage<T>, args: &ListArgs) {
    page.set_query(args.query.clone());
    page.select_status(&args.status);
}

// =============================================================================
// Lists
// =============================================================================

fn customer_rows(customers: &[CustomerView]) -> Vec<Vec<String>> {
    customers
        .iter()
        .map(|c| {
            vec![
                c.id.clone(),
                c.name.clone(),
                c.email.clone(),
                c.phone.clone(),
                c.order_count.to_string(),
                money(c.total_spent),
                c.status.label().to_string(),
            ]
        })
        .collect()
}

pub async fn customers(ctx: &Context, args: &ListArgs) -> CommandResult {
    let origin = format!("{}/customers", args.surface.prefix());
    let refresh = ctx.enter(args.surface.required_role(), &origin)?;

    let mut page = ListPage::<CustomerView>::new();
    let loaded = match args.surface {
        Surface::Admin => page.load(ctx.client.admin_customers()).await,
        Surface::Staff => page.load(ctx.client.staff_customers()).await,
    };
    if !loaded {
        settle(refresh).await;
        return Err(load_failed(&page).into());
    }
    apply_filters(&mut page, args);

    let summary: CustomerSummary = page.summary(|c| c.total_spent);
    emit(table(
        &["ID", "NAME", "EMAIL", "PHONE", "ORDERS", "SPENT", "STATUS"],
        &customer_rows(&page.visible()),
    ))?;
    emit(format!(
        "{} customers | Active {} | Inactive {} | Spent {}",
        summary.total(),
        summary.active(),
        summary.inactive(),
        money(summary.total_spent())
    ))?;

    settle(refresh).await;
    Ok(())
}

fn order_rows(orders: &[OrderView]) -> Vec<Vec<String>> {
    orders
        .iter()
        .map(|o| {
            vec![
                o.id.clone(),
                o.customer_name.clone(),
                o.package_name.clone(),
                money(o.amount),
                o.order_date.clone(),
                o.status.label().to_string(),
            ]
        })
        .collect()
}

pub async fn orders(ctx: &Context, args: &ListArgs) -> CommandResult {
    let origin = format!("{}/orders", args.surface.prefix());
    let refresh = ctx.enter(args.surface.required_role(), &origin)?;

    let mut page = ListPage::<OrderView>::new();
    let loaded = match args.surface {
        Surface::Admin => page.load(ctx.client.admin_orders()).await,
        Surface::Staff => page.load(ctx.client.staff_orders()).await,
    };
    if !loaded {
        settle(refresh).await;
        return Err(load_failed(&page).into());
    }
    apply_filters(&mut page, args);

    let summary = page.summary(|o| o.amount);
    emit(table(
        &["ID", "CUSTOMER", "PACKAGE", "AMOUNT", "ORDERED", "STATUS"],
        &order_rows(&page.visible()),
    ))?;
    emit(summary_line(&summary))?;
    emit(format!("Revenue {}", money(summary.amount())))?;

    settle(refresh).await;
    Ok(())
}

fn delivery_rows(deliveries: &[DeliveryView]) -> Vec<Vec<String>> {
    deliveries
        .iter()
        .map(|d| {
            vec![
                d.id.clone(),
                d.customer_name.clone(),
                d.address.clone(),
                format!("{} {}", d.scheduled_date, d.scheduled_time),
                d.driver_name.clone(),
                d.status.label().to_string(),
            ]
        })
        .collect()
}

pub async fn deliveries(ctx: &Context, args: &ListArgs) -> CommandResult {
    let refresh = ctx.enter(RequiredRole::Staff, "/staff/deliveries")?;

    let mut page = ListPage::<DeliveryView>::new();
    if !page.load(ctx.client.staff_deliveries()).await {
        settle(refresh).await;
        return Err(load_failed(&page).into());
    }
    apply_filters(&mut page, args);

    let summary = page.summary(|_| Decimal::ZERO);
    emit(table(
        &["ID", "CUSTOMER", "ADDRESS", "SCHEDULED", "DRIVER", "STATUS"],
        &delivery_rows(&page.visible()),
    ))?;
    emit(summary_line(&summary))?;

    settle(refresh).await;
    Ok(())
}

// =============================================================================
// Mutations
// =============================================================================

pub async fn set_status(ctx: &Context, target: StatusTarget) -> CommandResult {
    match target {
        StatusTarget::Order {
            id,
            status,
            surface,
        } => {
            let status: OrderStatus = parse_status(&status)?;
            let origin = format!("{}/orders", surface.prefix());
            let refresh = ctx.enter(surface.required_role(), &origin)?;

            let mut page = ListPage::<OrderView>::new();
            let loaded = match surface {
                Surface::Admin => page.load(ctx.client.admin_orders()).await,
                Surface::Staff => page.load(ctx.client.staff_orders()).await,
            };
            let result: CommandResult = if loaded {
                let updated = match surface {
                    Surface::Admin => {
                        let commit = ctx.client.update_admin_order_status(&id, status);
                        page.update_status(&id, status, commit).await
                    }
                    Surface::Staff => {
                        let commit = ctx.client.update_staff_order_status(&id, status);
                        page.update_status(&id, status, commit).await
                    }
                };
                updated.map_err(Into::into)
            } else {
                Err(load_failed(&page).into())
            };
            settle(refresh).await;
            result?;
            emit(format!("Order {id} is now {}", status.label()))?;
        }
        StatusTarget::Delivery { id, status } => {
            let status: DeliveryStatus = parse_status(&status)?;
            let refresh = ctx.enter(RequiredRole::Staff, "/staff/deliveries")?;

            let mut page = ListPage::<DeliveryView>::new();
            let result: CommandResult = if page.load(ctx.client.staff_deliveries()).await {
                let commit = ctx.client.update_delivery_status(&id, status);
                page.update_status(&id, status, commit)
                    .await
                    .map_err(Into::into)
            } else {
                Err(load_failed(&page).into())
            };
            settle(refresh).await;
            result?;
            emit(format!("Delivery {id} is now {}", status.label()))?;
        }
        StatusTarget::Customer { id, status } => {
            let status: CustomerStatus = parse_status(&status)?;
            let refresh = ctx.enter(RequiredRole::Admin, "/admin/customers")?;

            let mut page = ListPage::<CustomerView>::new();
            let result: CommandResult = if page.load(ctx.client.admin_customers()).await {
                let commit = ctx.client.update_customer_status(&id, status);
                page.update_status(&id, status, commit)
                    .await
                    .map_err(Into::into)
            } else {
                Err(load_failed(&page).into())
            };
            settle(refresh).await;
            result?;
            emit(format!("Customer {id} is now {}", status.label()))?;
        }
    }
    Ok(())
}

pub async fn contact(ctx: &Context, id: &str, method: String, notes: String) -> CommandResult {
    let refresh = ctx.enter(RequiredRole::Staff, "/staff/customers")?;
    let log = ContactLog {
        method,
        notes,
        contacted_at: Utc::now(),
    };
    let result = ctx.client.log_customer_contact(id, &log).await;
    settle(refresh).await;
    result?;
    emit(format!("Contact with customer {id} recorded"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use petalbox_core::{normalize_delivery, normalize_order};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_delivery_rows_use_normalized_status() {
        let rows = delivery_rows(&[normalize_delivery(&json!({
            "id": "d1",
            "customerName": "Mai",
            "status": "out_for_delivery",
            "scheduledDate": "2024-05-08",
            "timeSlot": "09:00-11:00"
        }))]);
        let row = rows.first().map(Vec::as_slice).unwrap_or_default();
        assert_eq!(row.get(3).map(String::as_str), Some("2024-05-08 09:00-11:00"));
        assert_eq!(row.last().map(String::as_str), Some("In progress"));
    }

    #[test]
    fn test_order_rows_format_amount() {
        let rows = order_rows(&[normalize_order(&json!({
            "id": 7,
            "totalAmount": 350_000,
            "status": "Shipped"
        }))]);
        let row = rows.first().map(Vec::as_slice).unwrap_or_default();
        assert_eq!(row.first().map(String::as_str), Some("7"));
        assert_eq!(row.last().map(String::as_str), Some("Shipping"));
    }
}
