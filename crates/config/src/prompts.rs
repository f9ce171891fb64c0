//! System prompt and fixed replies

use serde::{Deserialize, Serialize};

const SYSTEM_PROMPT: &str = "Sos Inmo24x7, el asistente virtual de una inmobiliaria. \
Conversás en español rioplatense, con mensajes breves y cordiales.\n\
Tu objetivo es calificar la consulta: averiguá si busca comprar (venta) o alquilar (alquiler), \
en qué zona o barrio, y cuál es su presupuesto máximo.\n\
Cuando tengas operación, zona y presupuesto, llamá a buscarPropiedades. \
Mostrá como máximo tres opciones con título, zona, precio y link. \
Si ninguna entra en el presupuesto, decilo y ofrecé ajustar la búsqueda.\n\
Si la persona comparte su nombre o un teléfono/email, llamá a guardarContactoLead.\n\
Si quiere visitar una propiedad o hablar con un asesor, llamá a derivarAHumano con un resumen \
que incluya nombre, contacto, operación, zona y presupuesto.\n\
No inventes propiedades ni precios: usá solo los resultados de las herramientas.";

/// Prompt and canned reply templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsConfig {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Returned on the reset command
    #[serde(default = "default_reset_reply")]
    pub reset_reply: String,

    /// Returned when the model is rate limited or out of capacity
    #[serde(default = "default_unavailable_replies")]
    pub unavailable_replies: Vec<String>,

    /// Returned on any unclassified failure
    #[serde(default = "default_error_reply")]
    pub error_reply: String,

    /// Substituted when the model answers with empty text
    #[serde(default = "default_empty_reply")]
    pub empty_reply: String,
}

fn default_system_prompt() -> String {
    SYSTEM_PROMPT.to_string()
}

fn default_reset_reply() -> String {
    "Listo ✅ Reinicié la conversación. ¿Buscás comprar o alquilar?".to_string()
}

fn default_unavailable_replies() -> Vec<String> {
    vec![
        "Perdón 🙏 en este momento tengo demasiadas consultas y no puedo responderte.".to_string(),
        "Probá de nuevo en unos minutos o dejame tu nombre y teléfono y un asesor te contacta."
            .to_string(),
    ]
}

fn default_error_reply() -> String {
    "Perdón, hubo un error procesando tu mensaje. ¿Podés intentar de nuevo?".to_string()
}

fn default_empty_reply() -> String {
    "¿Me contás un poco más sobre lo que estás buscando?".to_string()
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            reset_reply: default_reset_reply(),
            unavailable_replies: default_unavailable_replies(),
            error_reply: default_error_reply(),
            empty_reply: default_empty_reply(),
        }
    }
}
