//! Cart commands.

use anyhow::Result;
use turbo_cart::{CartError, Outcome};

use super::{ProductArgs, UpdateArgs};
use crate::context::{CartSession, Context};

/// Print the persisted cart.
pub async fn show(ctx: &Context) -> Result<()> {
    let session = ctx.open_cart()?;
    ctx.output.cart(&session.manager.cart());
    session.manager.close();
    Ok(())
}

/// Add one unit of a product.
pub async fn add(args: ProductArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_cart()?;

    let spinner = ctx
        .output
        .spinner(&format!("Adding product {}...", args.product_id));
    let result = session.manager.add_product(args.product_id).await;
    spinner.finish_and_clear();

    finish(
        &mut session,
        result,
        &format!("Added product {}", args.product_id),
        ctx,
    )
}

/// Remove a product entirely.
pub async fn remove(args: ProductArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_cart()?;
    let result = session.manager.remove_product(args.product_id).await;

    finish(
        &mut session,
        result,
        &format!("Removed product {}", args.product_id),
        ctx,
    )
}

/// Set the quantity of a product already in the cart.
pub async fn update(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_cart()?;

    let spinner = ctx
        .output
        .spinner(&format!("Checking stock for product {}...", args.product_id));
    let result = session
        .manager
        .update_product_amount(args.product_id, args.amount)
        .await;
    spinner.finish_and_clear();

    finish(
        &mut session,
        result,
        &format!("Product {} quantity set to {}", args.product_id, args.amount),
        ctx,
    )
}

fn finish(
    session: &mut CartSession,
    result: Result<Outcome, CartError>,
    success: &str,
    ctx: &Context,
) -> Result<()> {
    session.flush_notifications(&ctx.output);

    match result? {
        Outcome::Committed(cart) => {
            ctx.output.success(success);
            ctx.output.cart(&cart);
        }
        Outcome::Unchanged => {
            ctx.output.warn("Cart unchanged");
            ctx.output.cart(&session.manager.cart());
        }
    }

    Ok(())
}
