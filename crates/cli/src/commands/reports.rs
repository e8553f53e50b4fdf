//! Dashboards and period reports.

use std::path::Path;

use petalbox_client::{DashboardPage, ReportPage};
use petalbox_core::{DashboardStats, NormalizedStatus, Report, ReportPeriod, Trend};

use super::{CommandError, Context, Surface, settle};
use crate::output::{emit, money, table};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

const fn trend_word(trend: Trend) -> &'static str {
    match trend {
        Trend::Up => "up",
        Trend::Down => "down",
        Trend::Stable => "stable",
    }
}

fn change_text(change: f64, trend: Trend) -> String {
    format!("{change:+.1}% {}", trend_word(trend))
}

fn dashboard_text(stats: &DashboardStats) -> String {
    let mut lines = vec![
        format!("Orders          {}", stats.total_orders),
        format!("Pending orders  {}", stats.pending_orders),
        format!("Customers       {}", stats.total_customers),
        format!("Deliveries today {}", stats.today_deliveries),
        format!("Subscriptions   {}", stats.active_subscriptions),
        format!("Revenue         {}", money(stats.total_revenue)),
    ];

    if !stats.recent.is_empty() {
        let rows: Vec<Vec<String>> = stats
            .recent
            .iter()
            .map(|a| {
                vec![
                    a.id.clone(),
                    a.customer.clone(),
                    money(a.amount),
                    a.status.label().to_string(),
                    a.date.clone(),
                ]
            })
            .collect();
        lines.push(String::new());
        lines.push(table(&["ID", "CUSTOMER", "AMOUNT", "STATUS", "DATE"], &rows));
    }
    lines.join("\n")
}

fn report_text(period: ReportPeriod, report: &Report) -> String {
    let d = &report.deliveries;
    let o = &report.orders;
    let c = &report.customers;
    let p = &report.performance;

    let mut lines = vec![
        format!("Report for the {period}"),
        format!(
            "Deliveries {} ({}): pending {}, in progress {}, completed {}, cancelled {}",
            d.total,
            change_text(d.change, d.trend),
            d.pending,
            d.in_progress,
            d.completed,
            d.cancelled
        ),
        format!(
            "Orders {} ({}): pending {}, completed {}, cancelled {}, revenue {}",
            o.total,
            change_text(o.change, o.trend),
            o.pending,
            o.completed,
            o.cancelled,
            money(o.revenue)
        ),
        format!(
            "Customers {} ({}): new {}, active {}",
            c.total,
            change_text(c.change, c.trend),
            c.new,
            c.active
        ),
        format!(
            "Average delivery {:.0} min, on time {:.1}%, satisfaction {:.1}%",
            p.avg_delivery_time, p.on_time_rate, p.satisfaction_rate
        ),
    ];

    if !report.status_breakdown.is_empty() {
        let rows: Vec<Vec<String>> = report
            .status_breakdown
            .iter()
            .map(|s| vec![s.label.clone(), s.count.to_string(), format!("{:.1}%", s.percentage)])
            .collect();
        lines.push(String::new());
        lines.push(table(&["STATUS", "COUNT", "SHARE"], &rows));
    }

    if !report.top_drivers.is_empty() {
        let rows: Vec<Vec<String>> = report
            .top_drivers
            .iter()
            .map(|dr| {
                vec![
                    dr.name.clone(),
                    dr.deliveries.to_string(),
                    format!("{:.1}%", dr.on_time_rate),
                    format!("{:.1}", dr.rating),
                ]
            })
            .collect();
        lines.push(String::new());
        lines.push(table(&["DRIVER", "DELIVERIES", "ON TIME", "RATING"], &rows));
    }
    lines.join("\n")
}

pub async fn dashboard(ctx: &Context, surface: Surface) -> CommandResult {
    let refresh = ctx.enter(surface.required_role(), surface.prefix())?;

    let mut page = DashboardPage::new();
    let loaded = match surface {
        Surface::Admin => page.load(ctx.client.admin_dashboard()).await,
        Surface::Staff => page.load(ctx.client.staff_dashboard()).await,
    };
    settle(refresh).await;

    match page.data() {
        Some(stats) if loaded => emit(dashboard_text(stats))?,
        _ => {
            let message = page.error().unwrap_or("Could not load the dashboard");
            return Err(CommandError::Page(message.to_string()).into());
        }
    }
    Ok(())
}

pub async fn report(
    ctx: &Context,
    period: ReportPeriod,
    surface: Surface,
    export: Option<&Path>,
) -> CommandResult {
    let origin = format!("{}/reports", surface.prefix());
    let refresh = ctx.enter(surface.required_role(), &origin)?;

    let mut page = ReportPage::new(period);
    let loaded = match surface {
        Surface::Admin => page.load(ctx.client.admin_report(period)).await,
        Surface::Staff => page.load(ctx.client.staff_report(period)).await,
    };
    settle(refresh).await;

    let Some(report) = page.report().filter(|_| loaded) else {
        let message = page.error().unwrap_or("Could not load the report");
        return Err(CommandError::Page(message.to_string()).into());
    };
    emit(report_text(page.period(), report))?;

    if let Some(dir) = export {
        let path = page.export_to(dir)?;
        emit(format!("Exported to {}", path.display()))?;
    }
    Ok(())
}
