//! Payment commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an order and print the options to open the hosted widget with
//! mithadi pay --name "Asha" --email asha@example.com --contact 9876543210
//!
//! # Verify the widget's success callback and clear the cart
//! mithadi confirm order_Ox1 pay_Ox2 9f2c...
//! ```

use mithadi_storefront::payment::{PaymentConfirmation, Prefill};

use super::{CliError, Session};

/// Create a payment order and print the widget options as JSON.
pub async fn pay(
    session: &Session,
    name: Option<&str>,
    email: Option<&str>,
    contact: Option<&str>,
) -> Result<(), CliError> {
    let gateway = session.gateway()?;
    let prefill = Prefill::parse(name, email, contact)?;

    let options = session.cart.process_payment(&gateway, prefill).await?;
    tracing::info!(
        order_id = %options.order_id,
        amount = options.amount,
        "Payment order created"
    );

    let json = serde_json::to_string_pretty(&options)?;
    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}

/// Verify a success callback and clear the cart.
pub async fn confirm(
    session: &Session,
    order_id: String,
    payment_id: String,
    signature: String,
) -> Result<(), CliError> {
    let gateway = session.gateway()?;
    let confirmation = PaymentConfirmation {
        razorpay_payment_id: payment_id,
        razorpay_order_id: order_id,
        razorpay_signature: signature,
    };

    session.cart.complete_payment(&gateway, &confirmation).await?;
    tracing::info!(
        order_id = %confirmation.razorpay_order_id,
        payment_id = %confirmation.razorpay_payment_id,
        "Payment verified"
    );
    Ok(())
}
