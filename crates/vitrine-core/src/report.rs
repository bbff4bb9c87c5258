//! # Reports
//!
//! Read-only figures for the dashboard and the Reports screen.
//!
//! ```text
//!   revenue        Σ total of SALE-type sales in the period
//!   cost of goods  Σ unit_cost × qty of those sales (frozen at sale time)
//!   gross profit   revenue − cost of goods
//!   expenses       Σ expenses dated in the period
//!   net profit     gross profit − expenses
//! ```
//! Bags still out are not revenue yet; a settled bag counts on the day it
//! was settled.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::books::Books;
use crate::clock::business_date;
use crate::money::Money;
use crate::types::{Sale, SaleKind, SaleStatus};

/// Inclusive range of business dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Period {
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,
}

impl Period {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        if from <= to {
            Period { from, to }
        } else {
            Period { from: to, to: from }
        }
    }

    pub fn day(date: NaiveDate) -> Self {
        Period { from: date, to: date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinancialSummary {
    pub revenue: Money,
    pub cost_of_goods: Money,
    pub gross_profit: Money,
    pub expenses: Money,
    pub net_profit: Money,
    pub sales_count: usize,
    pub pieces_sold: i64,
    pub average_ticket: Money,
}

/// What one client owes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Receivable {
    pub client_id: String,
    pub client_name: String,
    pub phone: String,
    pub outstanding: Money,
    pub open_sales: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OpenBags {
    pub count: usize,
    pub pieces: i64,
    pub value: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryValuation {
    /// Units owned, including those out on bags.
    pub pieces: i64,
    pub pieces_on_bags: i64,
    pub at_cost: Money,
    pub at_retail: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BestSeller {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub revenue: Money,
}

fn revenue_date(sale: &Sale, utc_offset_minutes: i32) -> NaiveDate {
    business_date(sale.settled_at.unwrap_or(sale.created_at), utc_offset_minutes)
}

impl Books {
    /// SALE-type, non-cancelled sales whose revenue date falls in `period`.
    fn sales_in(&self, period: Period, utc_offset_minutes: i32) -> impl Iterator<Item = &Sale> {
        self.sale_values().filter(move |s| {
            s.kind == SaleKind::Sale
                && s.status != SaleStatus::Cancelled
                && period.contains(revenue_date(s, utc_offset_minutes))
        })
    }

    pub fn financial_summary(&self, period: Period, utc_offset_minutes: i32) -> FinancialSummary {
        let mut summary = FinancialSummary::default();

        for sale in self.sales_in(period, utc_offset_minutes) {
            summary.revenue += sale.total();
            summary.cost_of_goods += sale.items.iter().map(|i| i.line_cost()).sum::<Money>();
            summary.pieces_sold += sale.item_count();
            summary.sales_count += 1;
        }

        summary.expenses = self
            .expense_values()
            .filter(|e| period.contains(e.date))
            .map(|e| e.amount())
            .sum();

        summary.gross_profit = summary.revenue - summary.cost_of_goods;
        summary.net_profit = summary.gross_profit - summary.expenses;
        if summary.sales_count > 0 {
            summary.average_ticket = summary.revenue.split(summary.sales_count as u32).0;
        }
        summary
    }

    /// Clients with something to pay, largest balance first.
    pub fn receivables(&self) -> Vec<Receivable> {
        let mut out: Vec<Receivable> = self
            .client_values()
            .filter_map(|client| {
                let open: Vec<&Sale> = self
                    .sale_values()
                    .filter(|s| {
                        s.client_id == client.id && s.counts_as_debt() && s.remaining().is_positive()
                    })
                    .collect();
                if open.is_empty() {
                    return None;
                }
                Some(Receivable {
                    client_id: client.id.clone(),
                    client_name: client.name.clone(),
                    phone: client.phone.clone(),
                    outstanding: open.iter().map(|s| s.remaining()).sum(),
                    open_sales: open.len(),
                })
            })
            .collect();
        out.sort_by(|a, b| b.outstanding.cmp(&a.outstanding).then_with(|| a.client_name.cmp(&b.client_name)));
        out
    }

    pub fn open_bags(&self) -> OpenBags {
        self.sale_values()
            .filter(|s| s.is_open_bag())
            .fold(OpenBags::default(), |mut acc, s| {
                acc.count += 1;
                acc.pieces += s.item_count();
                acc.value += s.total();
                acc
            })
    }

    pub fn inventory_valuation(&self) -> InventoryValuation {
        self.product_values()
            .fold(InventoryValuation::default(), |mut acc, p| {
                acc.pieces += p.stock_quantity;
                acc.pieces_on_bags += p.on_bag_quantity;
                acc.at_cost += p.cost_price().multiply_quantity(p.stock_quantity);
                acc.at_retail += p.sale_price().multiply_quantity(p.stock_quantity);
                acc
            })
    }

    /// Products ranked by pieces sold in the period.
    pub fn best_sellers(&self, period: Period, utc_offset_minutes: i32, limit: usize) -> Vec<BestSeller> {
        let mut ranking: Vec<BestSeller> = Vec::new();
        for item in self
            .sales_in(period, utc_offset_minutes)
            .flat_map(|s| s.items.iter())
        {
            match ranking.iter_mut().find(|b| b.product_id == item.product_id) {
                Some(entry) => {
                    entry.quantity += item.quantity;
                    entry.revenue += item.line_total();
                }
                None => ranking.push(BestSeller {
                    product_id: item.product_id.clone(),
                    name: item.name_snapshot.clone(),
                    quantity: item.quantity,
                    revenue: item.line_total(),
                }),
            }
        }
        ranking.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| b.revenue.cmp(&a.revenue)));
        ranking.truncate(limit);
        ranking
    }
}
