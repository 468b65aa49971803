use crate::transport::{InlineButton, Keyboard};

pub const ADD_PAYMENT: &str = "Добавить оплату";
pub const SKIP: &str = "Пропустить";
pub const CANCEL: &str = "Отмена";

/// Префикс callback-данных выбора заказа: `order:<индекс варианта>`
pub const ORDER_CALLBACK_PREFIX: &str = "order:";

pub fn main_keyboard() -> Keyboard {
    Keyboard::Reply(vec![vec![ADD_PAYMENT.to_string()]])
}

pub fn skip_cancel_keyboard() -> Keyboard {
    Keyboard::Reply(vec![vec![SKIP.to_string()], vec![CANCEL.to_string()]])
}

/// По одной кнопке на вариант заказа
pub fn order_choice_keyboard(options: &[String]) -> Keyboard {
    Keyboard::Inline(
        options
            .iter()
            .enumerate()
            .map(|(idx, option)| {
                vec![InlineButton {
                    text: option.clone(),
                    data: format!("{}{}", ORDER_CALLBACK_PREFIX, idx),
                }]
            })
            .collect(),
    )
}

/// Индекс выбранного варианта из callback-данных
pub fn parse_order_callback(data: &str) -> Option<usize> {
    data.strip_prefix(ORDER_CALLBACK_PREFIX)?.parse().ok()
}
