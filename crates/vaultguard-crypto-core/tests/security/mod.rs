mod entropy_quality;
mod secret_hygiene;
