use clap::Args;
use presswork::signature::verify_payment_signature;
use presswork_app::config::Secret;

#[derive(Debug, Args)]
pub(crate) struct VerifySignatureArgs {
    /// Provider order id the payment was made against
    #[arg(long)]
    provider_order_id: String,

    /// Provider payment id
    #[arg(long)]
    provider_payment_id: String,

    /// Hex signature reported by the provider
    #[arg(long)]
    signature: String,

    /// Payment provider key secret
    #[arg(long, env = "PRESSWORK_PAYMENTS_KEY_SECRET", hide_env_values = true)]
    payments_key_secret: Secret,
}

pub(crate) fn run(args: &VerifySignatureArgs) -> Result<(), String> {
    verify_payment_signature(
        args.payments_key_secret.expose().as_bytes(),
        &args.provider_order_id,
        &args.provider_payment_id,
        &args.signature,
    )
    .map_err(|error| format!("signature rejected: {error}"))?;

    println!("signature: valid");

    Ok(())
}
