// src/i18n.rs
use serde::Deserialize;
use std::fmt;

/// Languages the composer can render its UI and messages in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Tr,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Tr, Language::En];

    pub fn code(self) -> &'static str {
        match self {
            Language::Tr => "tr",
            Language::En => "en",
        }
    }

    pub fn labels(self) -> &'static Labels {
        match self {
            Language::Tr => &TR,
            Language::En => &EN,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Every static piece of text the UI shows.
pub struct Labels {
    pub window_title: &'static str,
    pub heading: &'static str,
    pub colleague: &'static str,
    pub select_placeholder: &'static str,
    pub start_date: &'static str,
    pub start_time: &'static str,
    pub end_date: &'static str,
    pub end_time: &'static str,
    pub language: &'static str,
    pub preview: &'static str,
    pub preview_incomplete: &'static str,
    pub subject_prefix: &'static str,
    pub submit: &'static str,
    pub submit_busy: &'static str,
    pub err_incomplete: &'static str,
    pub err_invalid_datetime: &'static str,
    pub err_end_before_start: &'static str,
    pub applied: &'static str,
    pub instructions_shown: &'static str,
    pub instructions_title: &'static str,
    pub instruction_steps: [InstructionStep; 5],
    pub start_label: &'static str,
    pub end_label: &'static str,
    pub copy: &'static str,
    pub copied: &'static str,
    pub close: &'static str,
}

pub struct InstructionStep {
    pub title: &'static str,
    pub text: &'static str,
}

static TR: Labels = Labels {
    window_title: "Otomatik Yanıt",
    heading: "Yıllık İzin Otomatik Yanıtı",
    colleague: "Yerinize bakacak kişi:",
    select_placeholder: "Seçiniz...",
    start_date: "Başlangıç tarihi:",
    start_time: "Başlangıç saati:",
    end_date: "Bitiş tarihi:",
    end_time: "Bitiş saati:",
    language: "Dil:",
    preview: "Mesaj Önizleme",
    preview_incomplete: "Lütfen tüm alanları doldurun...",
    subject_prefix: "Konu:",
    submit: "Otomatik Yanıtı Ayarla",
    submit_busy: "Ayarlanıyor...",
    err_incomplete: "Lütfen tüm alanları doldurun!",
    err_invalid_datetime: "Tarih veya saat biçimi geçersiz!",
    err_end_before_start: "Bitiş tarihi başlangıç tarihinden sonra olmalıdır!",
    applied: "Otomatik yanıt başarıyla ayarlandı!",
    instructions_shown:
        "Otomatik yanıt ayarları hazırlandı! Lütfen talimatları takip ederek Outlook'ta etkinleştirin.",
    instructions_title: "Manuel Kurulum Talimatları",
    instruction_steps: [
        InstructionStep {
            title: "1. Outlook Ayarlarını Açın",
            text: "Dosya → Otomatik Yanıtlar (Ofis Dışında) menüsüne gidin.",
        },
        InstructionStep {
            title: "2. Otomatik Yanıtları Etkinleştirin",
            text: "\"Otomatik yanıtları gönder\" seçeneğini işaretleyin.",
        },
        InstructionStep {
            title: "3. Zaman Aralığını Ayarlayın",
            text: "\"Yalnızca şu zaman aralığında gönder\" seçeneğini işaretleyin:",
        },
        InstructionStep {
            title: "4. Mesaj İçeriğini Kopyalayın",
            text: "Aşağıdaki mesajı kopyalayıp \"Kuruluşum içinde\" ve \"Kuruluşum dışında\" alanlarına yapıştırın:",
        },
        InstructionStep {
            title: "5. Kaydedin",
            text: "\"Tamam\" butonuna tıklayarak ayarları kaydedin.",
        },
    ],
    start_label: "Başlangıç:",
    end_label: "Bitiş:",
    copy: "📋 Kopyala",
    copied: "✅ Kopyalandı!",
    close: "Kapat",
};

static EN: Labels = Labels {
    window_title: "Auto Reply",
    heading: "Annual Leave Automatic Reply",
    colleague: "Covering colleague:",
    select_placeholder: "Select...",
    start_date: "Start date:",
    start_time: "Start time:",
    end_date: "End date:",
    end_time: "End time:",
    language: "Language:",
    preview: "Message Preview",
    preview_incomplete: "Please fill in all fields...",
    subject_prefix: "Subject:",
    submit: "Set Automatic Reply",
    submit_busy: "Setting up...",
    err_incomplete: "Please fill in all fields!",
    err_invalid_datetime: "Invalid date or time format!",
    err_end_before_start: "End date must be after start date!",
    applied: "Automatic reply set successfully!",
    instructions_shown:
        "Automatic reply settings are ready! Please follow the instructions to enable them in Outlook.",
    instructions_title: "Manual Setup Instructions",
    instruction_steps: [
        InstructionStep {
            title: "1. Open Outlook Settings",
            text: "Go to File → Automatic Replies (Out of Office).",
        },
        InstructionStep {
            title: "2. Enable Automatic Replies",
            text: "Check \"Send automatic replies\".",
        },
        InstructionStep {
            title: "3. Set the Time Range",
            text: "Check \"Only send during this time range\":",
        },
        InstructionStep {
            title: "4. Copy the Message",
            text: "Copy the message below and paste it into both \"Inside My Organization\" and \"Outside My Organization\":",
        },
        InstructionStep {
            title: "5. Save",
            text: "Click \"OK\" to save the settings.",
        },
    ],
    start_label: "Start:",
    end_label: "End:",
    copy: "📋 Copy",
    copied: "✅ Copied!",
    close: "Close",
};
