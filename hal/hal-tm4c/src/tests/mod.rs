mod systick;
