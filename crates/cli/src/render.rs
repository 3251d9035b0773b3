//! Plain-text tables for stdout

use boxtrack_core::{BalanceSnapshot, BoxId, BoxStatus, PortfolioBox, Transaction};
use boxtrack_dashboard::DashboardSnapshot;

pub fn dashboard(snapshot: &DashboardSnapshot) {
    match &snapshot.balance {
        Some(b) => println!(
            "Balance   {} total | {} USDT | {} in coins",
            b.total_balance.fixed2(),
            b.usdt_balance.fixed2(),
            b.coin_balance.fixed2()
        ),
        None => println!("Balance   unavailable"),
    }
    if let Some(s) = &snapshot.summary {
        println!(
            "P/L       {} ({}%) | realized {} | unrealized {}",
            s.total_profit_loss.fixed2(),
            s.total_profit_loss_percentage.fixed2(),
            s.realized_profit_loss.fixed2(),
            s.unrealized_profit_loss.fixed2()
        );
    }
    println!();
    boxes(BoxStatus::Open, &snapshot.open_boxes);
    println!();
    boxes(BoxStatus::Closed, &snapshot.closed_boxes);
}

pub fn boxes(status: BoxStatus, boxes: &[PortfolioBox]) {
    let title = match status {
        BoxStatus::Open => "Open boxes",
        BoxStatus::Closed => "Closed boxes",
    };
    println!("{} ({})", title, boxes.len());
    if boxes.is_empty() {
        return;
    }
    println!(
        "{:>5}  {:<8} {:>14} {:>12} {:>12} {:>12} {:>8} {:>5}",
        "ID", "COIN", "AMOUNT", "AVG BUY", "PRICE", "P/L", "P/L %", "AGE"
    );
    for b in boxes {
        println!(
            "{:>5}  {:<8} {:>14} {:>12} {:>12} {:>12} {:>8} {:>4}d",
            b.id,
            b.coin_symbol,
            b.amount.to_string(),
            b.average_buy_price.fixed2(),
            b.current_price.fixed2(),
            b.profit_loss_value.fixed2(),
            b.profit_loss_percentage.fixed2(),
            b.age_days
        );
    }
}

pub fn ledger(box_id: BoxId, transactions: &[Transaction]) {
    println!("Box {} ({} transactions)", box_id, transactions.len());
    for tx in transactions {
        let realized = tx
            .realized_profit_loss()
            .map(|(value, pct)| format!("  P/L {} ({}%)", value.fixed2(), pct.fixed2()))
            .unwrap_or_default();
        println!(
            "{:>6}  {:<16} {:<4} {:>14} @ {:>12}  fee {}{}",
            tx.id,
            tx.transaction_date,
            tx.transaction_type.as_str(),
            tx.amount.to_string(),
            tx.price.fixed2(),
            tx.fee.fixed2(),
            realized
        );
    }
}

pub fn history(history: &[BalanceSnapshot]) {
    for s in history {
        println!(
            "{:<25} {:>14} total | {:>14} USDT | {:>14} coins",
            s.timestamp,
            s.total_balance.fixed2(),
            s.usdt_balance.fixed2(),
            s.coin_balance.fixed2()
        );
    }
}
