//! Prompt Builders

/// One model's forecast as shown to the reader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastSummary<'a> {
    pub model_name: &'a str,
    pub rainfall_mm: f64,
    pub category: &'a str,
}

/// Inputs shared by every prompt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptContext<'a> {
    pub location: &'a str,
    pub tavg: f64,
    pub rh_avg: f64,
}

/// Explanation of a single model's forecast
pub fn single_prompt(ctx: &PromptContext<'_>, forecast: &ForecastSummary<'_>) -> String {
    format!(
        "Anda adalah ahli meteorologi yang memberikan interpretasi prediksi curah hujan.\n\
         \n\
         Data Prediksi:\n\
         - Lokasi: {location}\n\
         - Model: {model}\n\
         - Curah Hujan Prediksi: {rainfall:.2} mm/hari\n\
         - Kategori: {category}\n\
         - Suhu Rata-rata: {tavg:?}°C\n\
         - Kelembapan Rata-rata: {rh_avg:?}%\n\
         \n\
         Berikan penjelasan yang:\n\
         1. Menginterpretasikan hasil prediksi curah hujan\n\
         2. Menjelaskan hubungan antara suhu, kelembapan, dan curah hujan\n\
         3. Memberikan saran praktis untuk masyarakat (misalnya: persiapan menghadapi hujan, aktivitas yang sesuai)\n\
         4. Dampak potensial dari intensitas hujan tersebut\n\
         5. Gunakan bahasa Indonesia yang mudah dipahami\n\
         \n\
         Jawaban harus dalam format paragraf yang informatif dan praktis (maksimal 200 kata).",
        location = ctx.location,
        model = forecast.model_name,
        rainfall = forecast.rainfall_mm,
        category = forecast.category,
        tavg = ctx.tavg,
        rh_avg = ctx.rh_avg,
    )
}

/// Side-by-side explanation of two models' forecasts
pub fn comparison_prompt(
    ctx: &PromptContext<'_>,
    first: &ForecastSummary<'_>,
    second: &ForecastSummary<'_>,
) -> String {
    let difference = (first.rainfall_mm - second.rainfall_mm).abs();
    format!(
        "Anda adalah ahli meteorologi yang membandingkan hasil dua model prediksi curah hujan.\n\
         \n\
         Data Prediksi:\n\
         - Lokasi: {location}\n\
         - Suhu Rata-rata: {tavg:?}°C\n\
         - Kelembapan Rata-rata: {rh_avg:?}%\n\
         - Model {first_name}: {first_rain:.2} mm/hari ({first_cat})\n\
         - Model {second_name}: {second_rain:.2} mm/hari ({second_cat})\n\
         - Selisih: {difference:.2} mm/hari\n\
         \n\
         Berikan penjelasan yang:\n\
         1. Membandingkan hasil kedua model dan menjelaskan kemungkinan penyebab perbedaannya\n\
         2. Menjelaskan hubungan antara suhu, kelembapan, dan curah hujan\n\
         3. Memberikan kesimpulan prediksi yang paling masuk akal\n\
         4. Memberikan saran praktis untuk masyarakat\n\
         5. Gunakan bahasa Indonesia yang mudah dipahami\n\
         \n\
         Jawaban harus dalam format paragraf yang informatif dan praktis (maksimal 250 kata).",
        location = ctx.location,
        tavg = ctx.tavg,
        rh_avg = ctx.rh_avg,
        first_name = first.model_name,
        first_rain = first.rainfall_mm,
        first_cat = first.category,
        second_name = second.model_name,
        second_rain = second.rainfall_mm,
        second_cat = second.category,
        difference = difference,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTX: PromptContext<'static> = PromptContext {
        location: "Stasiun Meteorologi Citeko, Kabupaten Bogor",
        tavg: 25.0,
        rh_avg: 80.0,
    };

    #[test]
    fn test_single_prompt_contents() {
        let prompt = single_prompt(
            &CTX,
            &ForecastSummary {
                model_name: "LSTM",
                rainfall_mm: 8.126,
                category: "Hujan Ringan 🌤️",
            },
        );
        assert!(prompt.contains("Model: LSTM"));
        assert!(prompt.contains("8.13 mm/hari"));
        assert!(prompt.contains("Suhu Rata-rata: 25.0°C"));
        assert!(prompt.contains("Kelembapan Rata-rata: 80.0%"));
        assert!(prompt.contains("Citeko"));
    }

    #[test]
    fn test_comparison_prompt_contents() {
        let prompt = comparison_prompt(
            &CTX,
            &ForecastSummary {
                model_name: "LSTM",
                rainfall_mm: 8.0,
                category: "Hujan Ringan 🌤️",
            },
            &ForecastSummary {
                model_name: "Prophet",
                rainfall_mm: 7.5,
                category: "Hujan Ringan 🌤️",
            },
        );
        assert!(prompt.contains("Model LSTM: 8.00 mm/hari"));
        assert!(prompt.contains("Model Prophet: 7.50 mm/hari"));
        assert!(prompt.contains("Selisih: 0.50 mm/hari"));
        assert!(prompt.contains("Suhu Rata-rata: 25.0°C"));
    }

    #[test]
    fn test_readings_keep_their_decimals() {
        let ctx = PromptContext {
            tavg: 25.25,
            rh_avg: 87.5,
            ..CTX
        };
        let prompt = single_prompt(
            &ctx,
            &ForecastSummary {
                model_name: "Prophet",
                rainfall_mm: 3.0,
                category: "Hujan Ringan 🌤️",
            },
        );
        assert!(prompt.contains("Suhu Rata-rata: 25.25°C"));
        assert!(prompt.contains("Kelembapan Rata-rata: 87.5%"));
    }
}
