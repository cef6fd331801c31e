use crate::error::{LurkError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};
use zbus::zvariant::Value;
use zbus::Connection;

use super::NotificationSink;

const DESTINATION: &str = "org.freedesktop.Notifications";
const PATH: &str = "/org/freedesktop/Notifications";

/// Уведомления через `org.freedesktop.Notifications` на сессионной шине
pub struct DBusNotifier {
    connection: Connection,
    app_name: String,
}

impl DBusNotifier {
    pub async fn connect(app_name: &str) -> Result<Self> {
        info!("Подключение к сервису уведомлений через D-Bus");

        let connection = Connection::session().await.map_err(LurkError::DBus)?;

        Ok(Self {
            connection,
            app_name: app_name.to_string(),
        })
    }

    async fn send(&self, text: &str, timeout: Duration) -> Result<u32> {
        let reply = self
            .connection
            .call_method(
                Some(DESTINATION),
                PATH,
                Some(DESTINATION),
                "Notify",
                &notify_body(&self.app_name, text, timeout),
            )
            .await?;

        let id: u32 = reply.body().deserialize()?;
        Ok(id)
    }
}

/// Аргументы `Notify`: app_name, replaces_id, app_icon, summary, body, actions, hints, expire_timeout
type NotifyBody<'a> = (
    &'a str,
    u32,
    &'a str,
    &'a str,
    &'a str,
    Vec<&'a str>,
    HashMap<&'a str, Value<'a>>,
    i32,
);

fn notify_body<'a>(app_name: &'a str, text: &'a str, timeout: Duration) -> NotifyBody<'a> {
    let expire_timeout = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
    (
        app_name,
        0,
        "",
        app_name,
        text,
        Vec::new(),
        HashMap::new(),
        expire_timeout,
    )
}

#[async_trait]
impl NotificationSink for DBusNotifier {
    async fn show(&self, text: &str, timeout: Duration) {
        match self.send(text, timeout).await {
            Ok(id) => info!("Уведомление #{} отправлено", id),
            Err(e) => warn!("Не удалось отправить уведомление через D-Bus: {}", e),
        }
    }
}
