//! Chat Responder
//!
//! Rule-based assistant. Each rule pairs a keyword predicate over the
//! lower-cased question with a template that reads the live watchlist and
//! the user's portfolio. The first matching rule answers; a help message
//! answers everything else. Nothing is remembered between questions.

pub mod knowledge;

use crate::types::{ChatReply, Holding, PortfolioSummary, Quote, Sector, WatchlistSnapshot};
use knowledge::{fundamentals, sector_outlook};
use std::fmt::Write;

/// Everything a rule may read.
pub struct ChatContext<'a> {
    pub watchlist: &'a WatchlistSnapshot,
    pub portfolio: &'a PortfolioSummary,
}

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;
type Responder = Box<dyn Fn(&ChatContext<'_>) -> String + Send + Sync>;

struct Rule {
    name: String,
    matches: Predicate,
    respond: Responder,
}

/// Stock aliases in match order.
const STOCK_ALIASES: &[(&[&str], &str)] = &[
    (&["tcs"], "TCS"),
    (&["reliance", "ril"], "RELIANCE"),
    (&["hdfc"], "HDFC"),
    (&["icici"], "ICICIBANK"),
    (&["sbi", "state bank"], "SBIN"),
    (&["kotak"], "KOTAKBANK"),
    (&["axis"], "AXISBANK"),
    (&["infy", "infosys"], "INFY"),
    (&["wipro"], "WIPRO"),
    (&["hcl"], "HCLTECH"),
    (&["tech mahindra", "techm"], "TECHM"),
    (&["hul", "hindustan"], "HINDUNILVR"),
    (&["itc"], "ITC"),
    (&["nestle"], "NESTLEIND"),
    (&["maruti"], "MARUTI"),
    (&["tata motor"], "TATAMOTORS"),
    (&["mahindra", "m&m"], "MAHINDRA"),
    (&["sun pharma"], "SUNPHARMA"),
    (&["dr reddy", "drreddy"], "DRREDDY"),
    (&["tata steel"], "TATASTEEL"),
    (&["jsw"], "JSWSTEEL"),
];

fn contains_any(question: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| question.contains(n))
}

pub struct ChatResponder {
    rules: Vec<Rule>,
}

impl Default for ChatResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatResponder {
    /// The standard rule list.
    pub fn new() -> Self {
        let mut rules = Vec::new();

        for &(aliases, symbol) in STOCK_ALIASES {
            rules.push(Rule {
                name: format!("stock:{}", symbol),
                matches: Box::new(move |q: &str| contains_any(q, aliases)),
                respond: Box::new(move |ctx: &ChatContext<'_>| analyze_stock(symbol, ctx)),
            });
        }

        rules.push(Rule {
            name: "sector:it".to_string(),
            matches: Box::new(|q: &str| contains_any(q, &["it sector", "tech sector"])),
            respond: Box::new(|ctx: &ChatContext<'_>| {
                sector_report(Sector::It, &["TCS", "INFY"], ctx)
            }),
        });
        rules.push(Rule {
            name: "sector:banking".to_string(),
            matches: Box::new(|q: &str| q.contains("bank") && q.contains("sector")),
            respond: Box::new(|ctx: &ChatContext<'_>| {
                sector_report(Sector::Banking, &["HDFC", "ICICIBANK"], ctx)
            }),
        });
        rules.push(Rule {
            name: "market".to_string(),
            matches: Box::new(|q: &str| contains_any(q, &["market", "nifty", "sensex"])),
            respond: Box::new(market_overview),
        });
        rules.push(Rule {
            name: "strategy".to_string(),
            matches: Box::new(|q: &str| contains_any(q, &["strategy", "how to trade"])),
            respond: Box::new(|_: &ChatContext<'_>| STRATEGY_GUIDE.to_string()),
        });
        rules.push(Rule {
            name: "top_picks".to_string(),
            matches: Box::new(|q: &str| contains_any(q, &["buy", "invest"])),
            respond: Box::new(|_: &ChatContext<'_>| top_picks()),
        });
        rules.push(Rule {
            name: "portfolio".to_string(),
            matches: Box::new(|q: &str| contains_any(q, &["portfolio", "my holdings"])),
            respond: Box::new(portfolio_review),
        });
        rules.push(Rule {
            name: "risk".to_string(),
            matches: Box::new(|q: &str| contains_any(q, &["risk", "stop loss", "money management"])),
            respond: Box::new(|_: &ChatContext<'_>| RISK_RULES.to_string()),
        });
        rules.push(Rule {
            name: "sell".to_string(),
            matches: Box::new(|q: &str| contains_any(q, &["sell", "exit", "book profit"])),
            respond: Box::new(|_: &ChatContext<'_>| SELL_RULES.to_string()),
        });
        rules.push(Rule {
            name: "technical".to_string(),
            matches: Box::new(|q: &str| contains_any(q, &["technical", "chart", "candlestick"])),
            respond: Box::new(|_: &ChatContext<'_>| TECHNICAL_GUIDE.to_string()),
        });

        Self { rules }
    }

    /// Answer a question. Always produces a reply.
    pub fn respond(&self, question: &str, ctx: &ChatContext<'_>) -> ChatReply {
        let question = question.to_lowercase();

        for rule in &self.rules {
            if (rule.matches)(&question) {
                return ChatReply {
                    reply: (rule.respond)(ctx),
                    rule: rule.name.clone(),
                };
            }
        }

        ChatReply {
            reply: help(),
            rule: "help".to_string(),
        }
    }

    /// Rule names in evaluation order (the help fallback excluded).
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }
}

// =============================================================================
// Templates
// =============================================================================

const RISK_RULES: &str = "⚠️ **RISK MANAGEMENT:** Position size: Max 10% per stock | \
Stop-loss: 7-10% for swing, 20% trailing for long-term | Diversify across sectors | \
Never use borrowed money!";

const SELL_RULES: &str = "🔴 **WHEN TO SELL:** Fundamentals deteriorating | \
Target hit (book 30% at +30% gain) | Better opportunity | Stock >15% of portfolio | \
DON'T sell on short-term dips!";

const STRATEGY_GUIDE: &str = "💼 **TRADING & INVESTMENT STRATEGIES**\n\n\
**1. Day Trading:** scalp 0.5-1% moves, max loss 0.5% of capital per trade, \
flat by 3:15 PM, no overnight positions.\n\
**2. Swing Trading:** hold 2-10 days on daily charts, enter on breakouts or \
pullbacks to the moving average, target 3-5%.\n\
**3. Position Trading:** fundamentals plus weekly charts, hold 1-6 months, \
rebalance quarterly.\n\
**4. Long-term Investing:** market leaders with a moat, monthly SIP, \
review yearly and sell only if the story breaks.\n\n\
**Which one?** <1 hour/day: long-term | 2-3 hours: swing | 4-6 hours: position | \
full day: day trading.\n\n\
Start with 80% long-term + 20% swing and adjust as you learn.";

const TECHNICAL_GUIDE: &str = "📊 **TECHNICAL ANALYSIS BASICS**\n\n\
**Candles:** 🟢 close > open is bullish, 🔴 close < open is bearish. \
Doji = indecision, Hammer = bullish reversal, Shooting Star = bearish reversal, \
Engulfing = strong signal, Morning/Evening Star = major reversal.\n\
**Support & Resistance:** levels tested 2-3 times. Buy at support with a bullish \
candle, sell at resistance with a bearish one, trade breakouts on volume.\n\
**Indicators:** 50/200-day MA (Golden Cross buy, Death Cross sell), \
RSI >70 overbought / <30 oversold, MACD signal-line crossovers.\n\
**Volume:** price up + volume up = strong trend; price up + volume down = weak rally.\n\
**Patterns:** Cup & Handle, Double Bottom, Ascending Triangle (bullish); \
Head & Shoulders, Double Top, Descending Triangle (bearish).";

fn signed(value: f64) -> &'static str {
    if value >= 0.0 {
        "+"
    } else {
        ""
    }
}

fn trend(change_percent: f64) -> &'static str {
    if change_percent > 1.0 {
        "Strong Bullish 🚀"
    } else if change_percent > 0.0 {
        "Mildly Bullish 📈"
    } else if change_percent < -1.0 {
        "Bearish 📉"
    } else {
        "Neutral ➡️"
    }
}

fn quote_line(quote: &Quote) -> String {
    format!(
        "₹{:.2} ({}{:.2}%)",
        quote.current_price,
        signed(quote.change_percent),
        quote.change_percent
    )
}

/// Deep-dive on one stock from its fundamentals and live quote.
pub fn analyze_stock(symbol: &str, ctx: &ChatContext<'_>) -> String {
    let Some(quote) = ctx.watchlist.quote(symbol) else {
        return format!("No live data available for {}. Please check the symbol.", symbol);
    };
    let Some(data) = fundamentals(symbol) else {
        return format!(
            "{} trading at ₹{:.2}. Limited fundamental data available.",
            quote.symbol, quote.current_price
        );
    };

    let cp = quote.change_percent;
    let price = quote.current_price;

    let valuation = if data.pe < 15.0 {
        "Undervalued ✅"
    } else if data.pe < 25.0 {
        "Fairly Valued"
    } else {
        "Expensive ⚠️"
    };
    let quality = if data.roe > 20.0 {
        "High Quality ⭐"
    } else if data.roe > 15.0 {
        "Good Quality"
    } else {
        "Average"
    };
    let debt = if data.debt < 0.5 {
        "Low Debt ✅"
    } else if data.debt < 1.0 {
        "Moderate Debt"
    } else {
        "High Debt ⚠️"
    };
    let verdict = if cp > 0.0 && data.pe < 20.0 && data.roe > 15.0 {
        "🟢 **STRONG BUY** - Excellent fundamentals + positive momentum"
    } else if cp < -2.0 && data.roe > 15.0 {
        "🟢 **BUY ON DIP** - Quality company at discount"
    } else if data.pe > 30.0 {
        "🔴 **AVOID/HOLD** - Too expensive"
    } else {
        "🟡 **ACCUMULATE** - Build position gradually"
    };

    let mut out = String::new();
    let _ = writeln!(out, "📊 **{} - {}**", quote.symbol, quote.name);
    let _ = writeln!(out);
    let _ = writeln!(out, "**LIVE PRICE:** {}", quote_line(quote));
    let _ = writeln!(out, "**Trend:** {}", trend(cp));
    let _ = writeln!(out);
    let _ = writeln!(out, "**FUNDAMENTALS:**");
    let _ = writeln!(out, "• Sector: {}", data.sector);
    let _ = writeln!(out, "• P/E Ratio: {}x ({})", data.pe, valuation);
    let _ = writeln!(out, "• ROE: {}% ({})", data.roe, quality);
    let _ = writeln!(out, "• Debt/Equity: {} ({})", data.debt, debt);
    let _ = writeln!(out, "• Net Margin: {}%", data.margin);
    let _ = writeln!(out, "• Dividend Yield: {}%", data.dividend);
    let _ = writeln!(out, "• Growth Rate: {}% YoY", data.growth);
    let _ = writeln!(out);
    let _ = writeln!(out, "**PRICE TARGETS:**");
    let _ = writeln!(out, "• Conservative (6M): ₹{:.2} (+8%)", price * 1.08);
    let _ = writeln!(out, "• Base Case (12M): ₹{:.2} (+15%)", price * 1.15);
    let _ = writeln!(out, "• Bull Case (18M): ₹{:.2} (+25%)", price * 1.25);
    let _ = writeln!(out, "• Stop Loss: ₹{:.2} (-8%)", price * 0.92);
    let _ = writeln!(out);
    let _ = write!(out, "**VERDICT:** {}", verdict);
    out
}

fn sector_report(sector: Sector, picks: &[&str], ctx: &ChatContext<'_>) -> String {
    let view = sector_outlook(sector);

    let mut out = String::new();
    let _ = writeln!(out, "**{} Sector Analysis**", sector);
    let _ = writeln!(out);
    let _ = writeln!(out, "Outlook: {}", view.outlook);
    let _ = writeln!(out, "Key Drivers: {}", view.drivers);
    let _ = writeln!(out, "Main Risks: {}", view.risks);
    let _ = writeln!(out);
    let _ = writeln!(out, "**TOP PICKS:**");
    for (i, symbol) in picks.iter().enumerate() {
        match ctx.watchlist.quote(symbol) {
            Some(quote) => {
                let _ = writeln!(out, "{}. {} - {}", i + 1, quote.name, quote_line(quote));
            }
            None => {
                let _ = writeln!(out, "{}. {} - no live data", i + 1, symbol);
            }
        }
    }
    let _ = write!(out, "\nAsk \"Analyze [stock]\" for a deep dive!");
    out
}

fn market_overview(ctx: &ChatContext<'_>) -> String {
    let watchlist = ctx.watchlist;
    let count = watchlist.quotes.len();
    let avg_change = if count > 0 {
        watchlist.quotes.iter().map(|q| q.change_percent).sum::<f64>() / count as f64
    } else {
        0.0
    };

    let sentiment = if avg_change > 0.3 {
        "🟢 Bullish"
    } else if avg_change < -0.3 {
        "🔴 Bearish"
    } else {
        "🟡 Neutral"
    };

    let mut out = String::new();
    let _ = writeln!(out, "📈 **MARKET ANALYSIS**");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Advancers: {} | Decliners: {} | Unchanged: {}",
        watchlist.advancers(),
        watchlist.decliners(),
        count - watchlist.advancers() - watchlist.decliners()
    );
    let _ = writeln!(out, "Average move: {}{:.2}%", signed(avg_change), avg_change);
    let _ = writeln!(out, "Sentiment: {}", sentiment);
    if let Some(gainer) = watchlist.top_gainer() {
        let _ = writeln!(out, "Top gainer: {} {}", gainer.symbol, quote_line(gainer));
    }
    if let Some(loser) = watchlist.top_loser() {
        let _ = writeln!(out, "Top loser: {} {}", loser.symbol, quote_line(loser));
    }
    let _ = write!(out, "\nAsk about specific stocks for detailed analysis.");
    out
}

fn top_picks() -> String {
    "💰 **TOP PICKS BY SECTOR:**\n\n\
     **IT:** TCS, Infosys\n\
     **Banking:** HDFC Bank, ICICI Bank\n\
     **Pharma:** Sun Pharma, Dr Reddy's\n\
     **Auto:** Maruti, Bajaj Auto\n\
     **FMCG:** HUL, ITC\n\n\
     Ask \"Analyze [stock]\" for deep dive!"
        .to_string()
}

fn holding_action(holding: &Holding) -> &'static str {
    let pct = holding.pnl_percent;
    if pct > 50.0 {
        "🟢 Book 50% profit"
    } else if pct > 30.0 {
        "🟢 Book 30% profit"
    } else if pct < -20.0 {
        "🔴 Review urgently!"
    } else if pct < -10.0 {
        "🟡 Monitor closely"
    } else {
        "➡️ HOLD"
    }
}

fn portfolio_review(ctx: &ChatContext<'_>) -> String {
    let portfolio = ctx.portfolio;
    if portfolio.is_empty() {
        return "📊 Build diversified portfolio across sectors. \
                Start with 2-3 stocks from IT, Banking, and FMCG."
            .to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "📊 **Your Portfolio**");
    let _ = writeln!(out);
    let _ = writeln!(out, "Holdings: {} stocks", portfolio.holdings.len());
    let _ = writeln!(out, "Invested: ₹{:.2}", portfolio.total_invested);
    let _ = writeln!(out, "Current: ₹{:.2}", portfolio.current_value);
    let _ = writeln!(
        out,
        "P&L: {}₹{:.2} ({}{:.2}%)",
        signed(portfolio.total_pnl),
        portfolio.total_pnl,
        signed(portfolio.total_pnl_percent),
        portfolio.total_pnl_percent
    );
    let _ = writeln!(out);

    for (i, h) in portfolio.holdings.iter().enumerate() {
        let _ = writeln!(out, "{}. **{}**", i + 1, h.symbol);
        let _ = writeln!(
            out,
            "   Qty: {} | Avg: ₹{:.2} | LTP: ₹{:.2}",
            h.quantity, h.avg_price, h.current_price
        );
        let _ = writeln!(
            out,
            "   P&L: {}₹{:.2} ({}{:.1}%)",
            signed(h.pnl),
            h.pnl,
            signed(h.pnl_percent),
            h.pnl_percent
        );
        let _ = writeln!(out, "   Action: {}", holding_action(h));
    }

    let diversification = match portfolio.holdings.len() {
        0..=4 => "⚠️ Under-diversified (add 3-5 stocks)",
        5..=12 => "✅ Good (manageable size)",
        _ => "⚠️ Over-diversified (consider consolidating)",
    };
    let _ = writeln!(out);
    let _ = write!(out, "Diversification: {}", diversification);
    out
}

fn help() -> String {
    "🤖 **AI TRADING ASSISTANT**\n\n\
     **26 Stocks Covered:**\n\
     • IT: TCS, Infosys, Wipro, HCL, Tech Mahindra\n\
     • Banking: HDFC, ICICI, SBI, Kotak, Axis\n\
     • Pharma: Sun Pharma, Dr Reddy's, Cipla, Biocon\n\
     • Auto: Maruti, Tata Motors, M&M, Bajaj Auto\n\
     • FMCG: HUL, ITC, Nestle, Britannia\n\
     • Metals: Tata Steel, JSW Steel, Hindalco\n\
     • Diversified: Reliance\n\n\
     **Ask:** \"Analyze Maruti\", \"IT sector outlook\" or \"Trading strategy\""
        .to_string()
}
