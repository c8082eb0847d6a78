//! # Checkout State Machine
//!
//! Drives a cart through payment review to a committed sale.
//!
//! ## States and Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout State Machine                               │
//! │                                                                         │
//! │  Idle ──begin(cart)──► Reviewing ──proceed_to_payment()──►              │
//! │   ▲    (EmptyCart                                                       │
//! │   │     guard)         AwaitingPaymentMethod ──select_method()──►       │
//! │   │                                                                     │
//! │   │                    AwaitingAmount ──enter_amount()──► Validated     │
//! │   │                         ▲  (InsufficientPayment                     │
//! │   │                         │   stays here)              │              │
//! │   │                         │                     begin_commit()        │
//! │   │                         │                            ▼              │
//! │  cancel()                   │                       Committing          │
//! │  (any state                 │                       │        │          │
//! │   except              retry_payment()          complete()  fail()       │
//! │   Committing)               │                       │        │          │
//! │                             │                       ▼        ▼          │
//! │                             └──────────────── Committed   Failed        │
//! │                                                              │          │
//! │                                         return_to_review()   │          │
//! │                                         (non-recoverable) ◄──┘          │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                                          Reviewing                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The machine itself is pure: it validates payment and assembles the
//! [`TransactionDraft`]. The async commit (stock re-validation, number
//! allocation, persistence) lives in the orchestration layer, which
//! reports back via [`Checkout::complete`] / [`Checkout::fail`]. The cart
//! must not be cleared until `complete()` - commit confirmation - and an
//! in-flight commit is never cancelled: `cancel()` is rejected while
//! Committing.

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartTotals};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DraftLine, PaymentMethod, TaxRate, TransactionDraft};

// =============================================================================
// Checkout State
// =============================================================================

/// Where a checkout currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    /// No checkout in progress.
    Idle,
    /// Cart captured, cashier reviewing the lines.
    Reviewing,
    /// Waiting for a payment method choice.
    AwaitingPaymentMethod,
    /// Waiting for the tendered amount.
    AwaitingAmount,
    /// Payment validated; ready to commit.
    Validated,
    /// Commit running; no new cycle may start.
    Committing,
    /// Terminal: sale persisted, cart cleared.
    Committed,
    /// Commit reported failure; retry or return to review.
    Failed,
}

impl CheckoutState {
    /// Short name for error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::Reviewing => "reviewing",
            CheckoutState::AwaitingPaymentMethod => "awaiting_payment_method",
            CheckoutState::AwaitingAmount => "awaiting_amount",
            CheckoutState::Validated => "validated",
            CheckoutState::Committing => "committing",
            CheckoutState::Committed => "committed",
            CheckoutState::Failed => "failed",
        }
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// A single checkout cycle over one cart.
///
/// Totals are captured at [`Checkout::begin`]; the cart is expected to
/// stay unchanged until the cycle ends (it is behind an exclusive lock
/// in the orchestration layer). [`Checkout::to_draft`] re-verifies this
/// and rejects a drifted cart.
#[derive(Debug, Clone)]
pub struct Checkout {
    state: CheckoutState,
    tax_rate: TaxRate,
    discount: Money,
    totals: Option<CartTotals>,
    method: Option<PaymentMethod>,
    tendered: Option<Money>,
    change: Money,
}

impl Checkout {
    /// Creates an idle checkout with the given tax rate and no discount.
    pub fn new(tax_rate: TaxRate) -> Self {
        Checkout {
            state: CheckoutState::Idle,
            tax_rate,
            discount: Money::zero(),
            totals: None,
            method: None,
            tendered: None,
            change: Money::zero(),
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// Totals captured at `begin`, if a cycle is in progress.
    pub fn totals(&self) -> Option<CartTotals> {
        self.totals
    }

    /// Selected payment method, if any.
    pub fn method(&self) -> Option<PaymentMethod> {
        self.method
    }

    /// Tendered amount, if entered.
    pub fn tendered(&self) -> Option<Money> {
        self.tendered
    }

    /// Change due. Zero until payment is validated.
    pub fn change(&self) -> Money {
        self.change
    }

    /// Sets a whole-sale discount. Only legal before `begin`.
    pub fn set_discount(&mut self, discount: Money) -> CoreResult<()> {
        self.expect(CheckoutState::Idle)?;
        self.discount = discount;
        Ok(())
    }

    /// Starts a checkout cycle: Idle → Reviewing.
    ///
    /// Fails with `EmptyCart` if the cart has no lines; an empty cart
    /// can never leave Idle.
    pub fn begin(&mut self, cart: &Cart) -> CoreResult<CartTotals> {
        self.expect(CheckoutState::Idle)?;
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let totals = cart.totals(self.tax_rate, self.discount);
        self.totals = Some(totals);
        self.state = CheckoutState::Reviewing;
        Ok(totals)
    }

    /// Reviewing → AwaitingPaymentMethod.
    pub fn proceed_to_payment(&mut self) -> CoreResult<()> {
        self.expect(CheckoutState::Reviewing)?;
        self.state = CheckoutState::AwaitingPaymentMethod;
        Ok(())
    }

    /// Chooses the payment method: AwaitingPaymentMethod → AwaitingAmount.
    ///
    /// The tendered amount defaults to the exact grand total. For cash it
    /// is editable via [`Checkout::enter_amount`]; for card and digital
    /// wallet it stays forced equal to the total - only cash ever
    /// produces a nonzero change amount.
    pub fn select_method(&mut self, method: PaymentMethod) -> CoreResult<()> {
        self.expect(CheckoutState::AwaitingPaymentMethod)?;

        self.method = Some(method);
        self.tendered = Some(self.grand_total());
        self.state = CheckoutState::AwaitingAmount;
        Ok(())
    }

    /// Enters the tendered amount: AwaitingAmount → Validated.
    ///
    /// ## Behavior
    /// - Cash below the grand total: `InsufficientPayment`, state is
    ///   unchanged so the cashier can re-enter
    /// - Cash at or above the total: change = tendered − total
    /// - Non-cash must equal the total exactly (no over/under tender)
    pub fn enter_amount(&mut self, amount: Money) -> CoreResult<()> {
        self.expect(CheckoutState::AwaitingAmount)?;
        let total = self.grand_total();

        // method is always set once we are past select_method
        let method = self.method.unwrap_or(PaymentMethod::Cash);

        if method.allows_change() {
            if amount < total {
                return Err(CoreError::InsufficientPayment {
                    total,
                    tendered: amount,
                });
            }
            self.change = amount - total;
        } else {
            if amount != total {
                return Err(CoreError::InvalidAmount {
                    reason: format!(
                        "non-cash payment must equal the total exactly: total {}, got {}",
                        total, amount
                    ),
                });
            }
            self.change = Money::zero();
        }

        self.tendered = Some(amount);
        self.state = CheckoutState::Validated;
        Ok(())
    }

    /// Builds the persistence draft from the validated payment and the
    /// cart's lines.
    ///
    /// Re-derives the cart totals and rejects the draft with `CartDrift`
    /// if they no longer match what was reviewed - the cycle must then
    /// be cancelled and restarted from the current cart contents.
    pub fn to_draft(
        &self,
        cart: &Cart,
        cashier_id: &str,
        cashier_name: &str,
        notes: Option<String>,
    ) -> CoreResult<TransactionDraft> {
        self.expect(CheckoutState::Validated)?;

        let captured = self.totals.ok_or(CoreError::EmptyCart)?;
        let current = cart.totals(self.tax_rate, self.discount);
        if current != captured {
            return Err(CoreError::CartDrift);
        }

        let lines = cart
            .items()
            .iter()
            .map(|item| DraftLine {
                product_id: item.product_id.clone(),
                name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: item.subtotal(),
                note: item.note.clone(),
            })
            .collect();

        Ok(TransactionDraft {
            cashier_id: cashier_id.to_string(),
            cashier_name: cashier_name.to_string(),
            lines,
            subtotal: captured.subtotal,
            tax: captured.tax,
            discount: captured.discount,
            total: captured.grand_total,
            payment_method: self.method.unwrap_or(PaymentMethod::Cash),
            paid: self.tendered.unwrap_or(captured.grand_total),
            change: self.change,
            notes,
        })
    }

    /// Marks the commit as started: Validated → Committing.
    ///
    /// From here the cycle must run to completion (success or reported
    /// failure); there is no cancellation of an in-flight commit.
    pub fn begin_commit(&mut self) -> CoreResult<()> {
        self.expect(CheckoutState::Validated)?;
        self.state = CheckoutState::Committing;
        Ok(())
    }

    /// Reports commit success: Committing → Committed (terminal).
    pub fn complete(&mut self) -> CoreResult<()> {
        self.expect(CheckoutState::Committing)?;
        self.state = CheckoutState::Committed;
        Ok(())
    }

    /// Reports commit failure: Committing → Failed.
    pub fn fail(&mut self) -> CoreResult<()> {
        self.expect(CheckoutState::Committing)?;
        self.state = CheckoutState::Failed;
        Ok(())
    }

    /// Recoverable failure path: Failed → AwaitingAmount for a retry.
    pub fn retry_payment(&mut self) -> CoreResult<()> {
        self.expect(CheckoutState::Failed)?;
        self.state = CheckoutState::AwaitingAmount;
        Ok(())
    }

    /// Non-recoverable failure path (e.g. catalog write failure):
    /// Failed → Reviewing. Payment entry is discarded.
    pub fn return_to_review(&mut self) -> CoreResult<()> {
        self.expect(CheckoutState::Failed)?;
        self.method = None;
        self.tendered = None;
        self.change = Money::zero();
        self.state = CheckoutState::Reviewing;
        Ok(())
    }

    /// Abandons the cycle and resets to Idle.
    ///
    /// Rejected while Committing: once persistence starts it runs to
    /// completion before any new cycle may begin.
    pub fn cancel(&mut self) -> CoreResult<()> {
        if self.state == CheckoutState::Committing {
            return Err(CoreError::InvalidState {
                expected: "any state except committing",
                actual: self.state.name(),
            });
        }
        self.totals = None;
        self.method = None;
        self.tendered = None;
        self.change = Money::zero();
        self.state = CheckoutState::Idle;
        Ok(())
    }

    fn grand_total(&self) -> Money {
        self.totals.map(|t| t.grand_total).unwrap_or(Money::zero())
    }

    fn expect(&self, state: CheckoutState) -> CoreResult<()> {
        if self.state != state {
            return Err(CoreError::InvalidState {
                expected: state.name(),
                actual: self.state.name(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
