use super::keyboards::{
    main_keyboard, order_choice_keyboard, parse_order_callback, skip_cancel_keyboard, ADD_PAYMENT,
    CANCEL, SKIP,
};
use super::stimulus::{Command, Incoming, Stimulus};
use crate::domain::a001_payment::form::parse_amount;
use crate::domain::a001_payment::service::{build_record_fields, failure_message, summary_message};
use crate::domain::a001_payment::{FormState, FormStep, Operator};
use crate::shared::airtable::RecordSink;
use crate::system::access::AccessList;
use crate::transport::{ChatId, ChatTransport};
use crate::usecases::u001_resolve_order::OrderResolver;
use contracts::domain::common::Slot;
use contracts::usecases::u001_resolve_order::ResolutionOutcome;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const DENIED_BOT: &str = "🚫 У вас нет доступа к этому боту";
const DENIED_ACTION: &str = "🚫 У вас нет доступа к этому действию";
const WELCOME: &str = "Добро пожаловать!\nНажмите кнопку ниже, чтобы добавить оплату";
const NO_DIALOG: &str = "Нет активного диалога";
const CANCELLED: &str = "Диалог отменён";
const IDLE_HINT: &str = "Нажмите «Добавить оплату» или отправьте вложение";

const ASK_ATTACHMENT: &str = "Добавьте вложение:";
const ASK_AMOUNT: &str = "Введите сумму:";
const ASK_NOTE: &str = "Введите примечание:";
const ASK_ORDER: &str = "Введите номер заказа:";
const ASK_ORDER_CHOICE: &str = "Выберите заказ:";

const WAIT_ATTACHMENT: &str = "Отправьте вложение или нажмите «Пропустить»";
const BAD_AMOUNT: &str = "❌ Введите положительное число";
const WAIT_CHOICE: &str = "Выберите заказ из списка выше или нажмите «Отмена»";
const STALE_CHOICE: &str = "Этот выбор уже неактуален";

type FormSlot = Arc<tokio::sync::Mutex<Option<FormState>>>;

/// Диалог добавления оплаты
///
/// Шаги: вложение → сумма → примечание → заказ → (выбор заказа) → запись в Airtable.
/// События одного чата обрабатываются строго по очереди, разные чаты друг
/// друга не ждут.
pub struct ConversationController {
    transport: Arc<dyn ChatTransport>,
    resolver: Arc<OrderResolver>,
    store: Arc<dyn RecordSink>,
    access: AccessList,
    forms: Mutex<HashMap<ChatId, FormSlot>>,
}

impl ConversationController {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        resolver: Arc<OrderResolver>,
        store: Arc<dyn RecordSink>,
        access: AccessList,
    ) -> Self {
        Self {
            transport,
            resolver,
            store,
            access,
            forms: Mutex::new(HashMap::new()),
        }
    }

    fn form_slot(&self, chat_id: ChatId) -> FormSlot {
        let mut forms = self.forms.lock().unwrap_or_else(|e| e.into_inner());
        forms.entry(chat_id).or_default().clone()
    }

    /// Убрать слот чата, если формы в нём нет и его никто больше не ждёт
    fn release_slot(&self, chat_id: ChatId, slot: FormSlot) {
        let mut forms = self.forms.lock().unwrap_or_else(|e| e.into_inner());
        // Ссылок ровно две: карта и `slot`
        let owned = forms
            .get(&chat_id)
            .is_some_and(|current| Arc::ptr_eq(current, &slot));
        if !owned || Arc::strong_count(&slot) > 2 {
            return;
        }
        let idle = slot
            .try_lock()
            .map(|form| form.is_none())
            .unwrap_or(false);
        if idle {
            forms.remove(&chat_id);
        }
    }

    /// Текущее состояние формы чата (`None`, если диалога нет)
    pub async fn form_state(&self, chat_id: ChatId) -> Option<FormState> {
        let slot = self
            .forms
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&chat_id)
            .cloned();
        match slot {
            Some(slot) => slot.lock().await.clone(),
            None => None,
        }
    }

    /// Обработать одно событие
    pub async fn handle(&self, incoming: Incoming) -> anyhow::Result<()> {
        let Incoming {
            chat_id,
            operator,
            stimulus,
        } = incoming;

        if !self.access.is_authorized(operator.id) {
            tracing::warn!(
                "Отказ в доступе: user_id={} ({})",
                operator.id,
                operator.display_name()
            );
            let text = match stimulus {
                Stimulus::Command(Command::Start) => DENIED_BOT,
                _ => DENIED_ACTION,
            };
            return self.transport.send_message(chat_id, text).await;
        }

        let slot = self.form_slot(chat_id);
        let result = {
            let mut form = slot.lock().await;
            self.dispatch(chat_id, &operator, &mut form, stimulus).await
        };
        self.release_slot(chat_id, slot);
        result
    }

    async fn dispatch(
        &self,
        chat_id: ChatId,
        operator: &Operator,
        form: &mut Option<FormState>,
        stimulus: Stimulus,
    ) -> anyhow::Result<()> {
        match stimulus {
            Stimulus::Command(Command::Start) => {
                self.transport
                    .send_keyboard(chat_id, WELCOME, &main_keyboard())
                    .await
            }
            Stimulus::Command(Command::Cancel) => self.cancel(chat_id, form).await,
            Stimulus::Text(text) if text.trim() == CANCEL => self.cancel(chat_id, form).await,
            Stimulus::Text(text) if text.trim() == ADD_PAYMENT => {
                tracing::info!("Чат {}: новая оплата", chat_id);
                *form = Some(FormState::new());
                self.ask(chat_id, ASK_ATTACHMENT).await
            }
            Stimulus::Attachment(file_ref) => {
                if let Some(current) = form.as_ref() {
                    if current.step != FormStep::Attachment {
                        tracing::info!(
                            "Чат {}: вложение на шаге {:?}, форма начата заново",
                            chat_id,
                            current.step
                        );
                    }
                }
                *form = Some(FormState::with_attachment(file_ref));
                self.ask(chat_id, ASK_AMOUNT).await
            }
            Stimulus::Text(text) => {
                if form.is_none() {
                    return self
                        .transport
                        .send_keyboard(chat_id, IDLE_HINT, &main_keyboard())
                        .await;
                }
                self.on_text(chat_id, operator, form, text.trim()).await
            }
            Stimulus::Callback(data) => self.on_callback(chat_id, operator, form, &data).await,
        }
    }

    async fn on_text(
        &self,
        chat_id: ChatId,
        operator: &Operator,
        form: &mut Option<FormState>,
        text: &str,
    ) -> anyhow::Result<()> {
        let Some(state) = form.as_mut() else {
            return Ok(());
        };
        let skip = text == SKIP;

        match state.step {
            FormStep::Attachment => {
                if !skip {
                    return self.ask(chat_id, WAIT_ATTACHMENT).await;
                }
                state.attachment_ref = Slot::Skipped;
                state.step = FormStep::Amount;
                self.ask(chat_id, ASK_AMOUNT).await
            }
            FormStep::Amount => {
                if skip {
                    state.amount = Slot::Skipped;
                } else {
                    match parse_amount(text) {
                        Some(amount) => state.amount = Slot::Provided(amount),
                        None => return self.ask(chat_id, BAD_AMOUNT).await,
                    }
                }
                state.step = FormStep::Note;
                self.ask(chat_id, ASK_NOTE).await
            }
            FormStep::Note => {
                state.note = if skip || text.is_empty() {
                    Slot::Skipped
                } else {
                    Slot::Provided(text.to_string())
                };
                state.step = FormStep::Order;
                self.ask(chat_id, ASK_ORDER).await
            }
            FormStep::Order => {
                if skip {
                    state.order = Slot::Skipped;
                    return self.finish(chat_id, operator, form).await;
                }
                if text.is_empty() {
                    return self.ask(chat_id, ASK_ORDER).await;
                }
                self.on_order_input(chat_id, operator, form, text).await
            }
            FormStep::OrderSelection => self.ask(chat_id, WAIT_CHOICE).await,
        }
    }

    async fn on_order_input(
        &self,
        chat_id: ChatId,
        operator: &Operator,
        form: &mut Option<FormState>,
        text: &str,
    ) -> anyhow::Result<()> {
        let outcome = self.resolver.resolve_input(text).await;
        let Some(state) = form.as_mut() else {
            return Ok(());
        };

        match outcome {
            ResolutionOutcome::Accepted(order) => {
                state.order = Slot::Provided(order);
                self.finish(chat_id, operator, form).await
            }
            ResolutionOutcome::Choose(options) => {
                let keyboard = order_choice_keyboard(&options);
                match self
                    .transport
                    .send_keyboard(chat_id, ASK_ORDER_CHOICE, &keyboard)
                    .await
                {
                    Ok(()) => {
                        state.order_options = options;
                        state.step = FormStep::OrderSelection;
                        Ok(())
                    }
                    Err(e) => {
                        tracing::warn!("Не удалось отправить выбор заказа: {}", e);
                        state.order = Slot::Provided(text.to_string());
                        self.finish(chat_id, operator, form).await
                    }
                }
            }
        }
    }

    async fn on_callback(
        &self,
        chat_id: ChatId,
        operator: &Operator,
        form: &mut Option<FormState>,
        data: &str,
    ) -> anyhow::Result<()> {
        let selected = form
            .as_ref()
            .filter(|state| state.step == FormStep::OrderSelection)
            .and_then(|state| {
                parse_order_callback(data).and_then(|idx| state.order_options.get(idx).cloned())
            });

        let Some(order) = selected else {
            tracing::debug!("Чат {}: callback '{}' вне шага выбора заказа", chat_id, data);
            return self.transport.send_message(chat_id, STALE_CHOICE).await;
        };

        if let Some(state) = form.as_mut() {
            state.order = Slot::Provided(order);
        }
        self.finish(chat_id, operator, form).await
    }

    async fn cancel(&self, chat_id: ChatId, form: &mut Option<FormState>) -> anyhow::Result<()> {
        let text = if form.take().is_some() {
            tracing::info!("Чат {}: диалог отменён", chat_id);
            CANCELLED
        } else {
            NO_DIALOG
        };
        self.transport
            .send_keyboard(chat_id, text, &main_keyboard())
            .await
    }

    /// Сохранить форму в Airtable; форма очищается при любом исходе
    async fn finish(
        &self,
        chat_id: ChatId,
        operator: &Operator,
        form: &mut Option<FormState>,
    ) -> anyhow::Result<()> {
        let Some(state) = form.take() else {
            return Ok(());
        };
        let sender_name = operator.display_name();

        let attachment_url = match state.attachment_ref.provided() {
            Some(file_ref) => match self.transport.resolve_attachment_url(file_ref).await {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::error!("Ошибка при получении ссылки на файл {}: {}", file_ref, e);
                    None
                }
            },
            None => None,
        };

        let fields = build_record_fields(&state, &sender_name, attachment_url);
        match self.store.create_record(&fields).await {
            Ok(record_id) => {
                tracing::info!("Чат {}: оплата сохранена, запись {}", chat_id, record_id);
                self.transport
                    .send_keyboard(
                        chat_id,
                        &summary_message(&state, &sender_name),
                        &main_keyboard(),
                    )
                    .await
            }
            Err(e) => {
                tracing::error!("Ошибка при сохранении данных: {}", e);
                self.transport
                    .send_message(chat_id, &failure_message(&e.to_string()))
                    .await
            }
        }
    }

    async fn ask(&self, chat_id: ChatId, text: &str) -> anyhow::Result<()> {
        self.transport
            .send_keyboard(chat_id, text, &skip_cancel_keyboard())
            .await
    }
}
