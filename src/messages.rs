//! User-facing texts. Every abort path of the intent flow maps to exactly
//! one of these; keep them in sync with what the channel audience sees.

use std::collections::HashMap;

use strfmt::strfmt;

use crate::entries::{Order, OrderSide};

pub const START: &str = concat!(
    "¡Hola! Soy un bot para comprar y vender sats por tu moneda local, ",
    "de persona a persona.\n\n",
    "Publica una oferta de venta con /sell o una de compra con /buy."
);

pub const NON_REGISTERED: &str =
    "Para usar este bot primero debes inicializarlo con el comando /start";

pub const USER_BLOCKED: &str = "No puedes usar este bot, tu cuenta está bloqueada.";

pub const WAIT_TAKER: &str =
    "Espera a que alguien tome tu oferta, te avisaré cuando eso suceda.";

pub const CANCEL_HINT: &str =
    "Puedes cancelar esta orden antes de que alguien la tome ejecutando:";

pub const GENERIC_ERROR: &str =
    "Ha ocurrido un error, por favor intenta nuevamente más tarde.";

pub const CANCEL_USAGE: &str = "/cancel <id_de_orden>";

pub const NOT_YOUR_ORDER: &str = "Esta orden no es tuya.";

pub const ORDER_NOT_CANCELLABLE: &str = "Esta orden ya no puede cancelarse.";

pub const ORDER_NOT_FOUND: &str = "No encontramos esa orden.";

fn side_noun(side: OrderSide) -> &'static str {
    match side {
        OrderSide::Buy => "compra",
        OrderSide::Sell => "venta",
    }
}

pub fn usage(side: OrderSide) -> String {
    format!(
        "{} <monto_en_sats> <monto_en_fiat> <codigo_fiat> <método_de_pago> [margen_de_precio]",
        side.as_command()
    )
}

pub fn already_open(side: OrderSide) -> String {
    format!(
        "Ya tienes una orden de {} abierta, espera a que alguien la tome o cancélala antes de crear una nueva.",
        side_noun(side)
    )
}

pub fn published(side: OrderSide) -> String {
    format!("¡Has publicado tu oferta de {}!", side_noun(side))
}

const ANNOUNCEMENT_TEMPLATE: &str = concat!(
    "⚡️ Nueva oferta de {side} ⚡️\n\n",
    "{command}\n\n",
    "{sats} sats por {fiat} {code}\n",
    "Pago por {method}\n",
    "Id: {id}"
);

/// The channel summary. The second line is the verbatim command that created
/// the order, so the listed terms can be replayed as-is.
pub fn order_announcement(order: &Order) -> String {
    let mut vars = HashMap::new();
    vars.insert("side".to_owned(), side_noun(order.side).to_owned());
    vars.insert("command".to_owned(), order.command_line());
    vars.insert("sats".to_owned(), order.amount_sats.to_string());
    vars.insert("fiat".to_owned(), order.amount_fiat.to_string());
    vars.insert("code".to_owned(), order.fiat_code.to_uppercase());
    vars.insert("method".to_owned(), order.payment_method.clone());
    vars.insert("id".to_owned(), order.id.clone());

    strfmt(ANNOUNCEMENT_TEMPLATE, &vars).unwrap_or_else(|_| ANNOUNCEMENT_TEMPLATE.to_owned())
}

pub fn cancel_command(order_id: &str) -> String {
    format!("/cancel {}", order_id)
}

pub fn order_cancelled(order_id: &str) -> String {
    format!("¡Has cancelado la orden {}!", order_id)
}
