//! Common types used across Swapchain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwapchainError};

/// Which side of the swap the local user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Creates a new swap and hands its parameters to the counterparty.
    #[default]
    Proposer,
    /// Joins a swap someone else proposed.
    Accepter,
}

/// Network the swap is executed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Network {
    /// Real funds.
    Mainnet,
    /// Test currencies (default).
    #[default]
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "MAINNET",
            Network::Testnet => "TESTNET",
        }
    }

    /// Note shown next to the network choice.
    pub fn description(&self) -> &'static str {
        match self {
            Network::Mainnet => "You are sending real money!",
            Network::Testnet => "Send test currencies on the testnet",
        }
    }
}

impl FromStr for Network {
    type Err = SwapchainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MAINNET" => Ok(Network::Mainnet),
            "TESTNET" => Ok(Network::Testnet),
            other => Err(SwapchainError::invalid_value(
                "networkToTrade",
                format!("unknown network '{}'", other),
            )),
        }
    }
}

/// Currency the local user gives away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    /// Bitcoin (default).
    #[default]
    Btc,
    /// Bitshares.
    Bts,
}

impl Currency {
    /// Ticker symbol shown next to amounts.
    pub fn ticker(&self) -> &'static str {
        match self {
            Currency::Btc => "BTC",
            Currency::Bts => "BTS",
        }
    }

    /// The currency received in exchange.
    pub fn counter(&self) -> Currency {
        match self {
            Currency::Btc => Currency::Bts,
            Currency::Bts => Currency::Btc,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ticker())
    }
}

impl FromStr for Currency {
    type Err = SwapchainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BTC" => Ok(Currency::Btc),
            "BTS" => Ok(Currency::Bts),
            other => Err(SwapchainError::invalid_value(
                "currencyToGive",
                format!("unknown currency '{}'", other),
            )),
        }
    }
}

/// HTLC expiry, measured in blocks.
///
/// One block is nominally ten minutes, so the variants map to roughly one,
/// two and three hours. Both parties must pick the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Timelock {
    #[default]
    Short,
    Medium,
    Long,
}

impl Timelock {
    /// Expiry in blocks.
    pub fn blocks(&self) -> u32 {
        match self {
            Timelock::Short => 6,
            Timelock::Medium => 12,
            Timelock::Long => 18,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timelock::Short => "SHORT",
            Timelock::Medium => "MEDIUM",
            Timelock::Long => "LONG",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Timelock::Short => "Around 1 hour. This is the shortest duration possible while making sure the transactions are confirmed in time.",
            Timelock::Medium => "Around 2 hours. Offers more time for the counterparty to come online.",
            Timelock::Long => "Around 3 hours. Gives your counterparty even more time.",
        }
    }
}

impl FromStr for Timelock {
    type Err = SwapchainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SHORT" => Ok(Timelock::Short),
            "MEDIUM" => Ok(Timelock::Medium),
            "LONG" => Ok(Timelock::Long),
            other => Err(SwapchainError::invalid_value(
                "timelock",
                format!("unknown timelock '{}'", other),
            )),
        }
    }
}

/// Fee priority hint, passed through to the swap executor untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Highest fees, fastest confirmation (default).
    #[default]
    High,
    Medium,
    /// Lowest fees, may wait a few more blocks.
    Low,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Priority::High => "You pay the highest fees to increase the chance for your transaction to be picked up by the miners.",
            Priority::Medium => "You pay a moderate amount of fees so miners will probably confirm your transaction soon.",
            Priority::Low => "You pay the lowest fees but might have to wait a few more blocks for your transaction to be confirmed.",
        }
    }
}

impl FromStr for Priority {
    type Err = SwapchainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(Priority::High),
            "MEDIUM" => Ok(Priority::Medium),
            "LOW" => Ok(Priority::Low),
            other => Err(SwapchainError::invalid_value(
                "priority",
                format!("unknown priority '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timelock_blocks_increase() {
        assert_eq!(Timelock::Short.blocks(), 6);
        assert!(Timelock::Medium.blocks() > Timelock::Short.blocks());
        assert!(Timelock::Long.blocks() > Timelock::Medium.blocks());
    }

    #[test]
    fn test_mainnet_warns_about_real_funds() {
        assert_eq!(Network::Mainnet.description(), "You are sending real money!");
        assert!(Priority::Low.description().contains("lowest fees"));
    }

    #[test]
    fn test_currency_counter() {
        assert_eq!(Currency::Btc.counter(), Currency::Bts);
        assert_eq!(Currency::Bts.counter(), Currency::Btc);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Network::Mainnet).unwrap(), "\"MAINNET\"");
        assert_eq!(serde_json::to_string(&Currency::Bts).unwrap(), "\"BTS\"");
        assert_eq!(serde_json::to_string(&Timelock::Long).unwrap(), "\"LONG\"");
        assert_eq!(serde_json::to_string(&Mode::Proposer).unwrap(), "\"proposer\"");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!(" bts ".parse::<Currency>().unwrap(), Currency::Bts);
        assert_eq!("Medium".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("weekly".parse::<Timelock>().is_err());
    }
}
