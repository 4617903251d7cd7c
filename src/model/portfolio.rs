use crate::error::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeFill {
    pub side: TradeSide,
    pub qty: u64,
    pub price: u64,
    /// Set on sells: proceeds minus average cost of the shares sold.
    pub realized_pnl: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: u64,
    pub holdings: u64,
    pub avg_cost: f64,
    pub realized_pnl: f64,
    pub trade_count: u32,
    pub win_streak: u32,
    pub best_win_streak: u32,
}

impl Portfolio {
    pub fn new(cash: u64) -> Self {
        Self {
            cash,
            holdings: 0,
            avg_cost: 0.0,
            realized_pnl: 0.0,
            trade_count: 0,
            win_streak: 0,
            best_win_streak: 0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.holdings == 0
    }

    pub fn holdings_value(&self, price: u64) -> u64 {
        self.holdings.saturating_mul(price)
    }

    pub fn total_assets(&self, price: u64) -> u64 {
        self.cash.saturating_add(self.holdings_value(price))
    }

    /// Profit relative to `initial_cash`, in percent.
    pub fn profit_rate(&self, price: u64, initial_cash: u64) -> f64 {
        if initial_cash == 0 {
            return 0.0;
        }
        (self.total_assets(price) as f64 - initial_cash as f64) / initial_cash as f64 * 100.0
    }

    pub fn buy(&mut self, qty: u64, price: u64) -> Result<TradeFill, GameError> {
        if qty == 0 {
            return Err(GameError::InvalidQuantity);
        }
        let cost = qty.checked_mul(price).unwrap_or(u64::MAX);
        if cost > self.cash {
            return Err(GameError::InsufficientFunds {
                needed: cost,
                available: self.cash,
            });
        }

        let total_cost = self.avg_cost * self.holdings as f64 + cost as f64;
        self.cash -= cost;
        self.holdings += qty;
        self.avg_cost = total_cost / self.holdings as f64;
        self.trade_count += 1;

        Ok(TradeFill {
            side: TradeSide::Buy,
            qty,
            price,
            realized_pnl: None,
        })
    }

    pub fn sell(&mut self, qty: u64, price: u64) -> Result<TradeFill, GameError> {
        if qty == 0 {
            return Err(GameError::InvalidQuantity);
        }
        if qty > self.holdings {
            return Err(GameError::InsufficientShares {
                requested: qty,
                held: self.holdings,
            });
        }

        let proceeds = qty.saturating_mul(price);
        let pnl = proceeds as f64 - self.avg_cost * qty as f64;
        self.cash = self.cash.saturating_add(proceeds);
        self.holdings -= qty;
        if self.holdings == 0 {
            self.avg_cost = 0.0;
        }
        self.realized_pnl += pnl;
        self.trade_count += 1;

        if pnl > 0.0 {
            self.win_streak += 1;
            self.best_win_streak = self.best_win_streak.max(self.win_streak);
        } else {
            self.win_streak = 0;
        }

        Ok(TradeFill {
            side: TradeSide::Sell,
            qty,
            price,
            realized_pnl: Some(pnl),
        })
    }

    pub fn credit(&mut self, amount: u64) {
        self.cash = self.cash.saturating_add(amount);
    }

    pub fn debit(&mut self, amount: u64) -> Result<(), GameError> {
        if amount > self.cash {
            return Err(GameError::InsufficientFunds {
                needed: amount,
                available: self.cash,
            });
        }
        self.cash -= amount;
        Ok(())
    }

    /// Multiply share count by `factor`, keeping cost basis per position constant.
    pub fn split(&mut self, factor: u64) {
        if factor <= 1 {
            return;
        }
        self.holdings = self.holdings.saturating_mul(factor);
        self.avg_cost /= factor as f64;
    }
}
